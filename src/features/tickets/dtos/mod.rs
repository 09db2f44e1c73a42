mod ticket_dto;

pub use ticket_dto::{
    AppointmentFieldsDto, BlotterFieldsDto, ComplaintFieldsDto, InvolvedPersonDto,
    SuggestionFieldsDto, TicketEnvelopeDto, TicketEnvelopeResponseDto, TicketFieldsDto,
    TicketListQuery, TicketResponseDto, TransitionStatusDto, UploadDocumentDto,
};
