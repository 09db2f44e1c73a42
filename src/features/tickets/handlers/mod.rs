pub mod ticket_handler;

pub use ticket_handler::{
    __path_attach_document, __path_create_ticket, __path_get_ticket, __path_get_ticket_by_number,
    __path_list_tickets, __path_transition_ticket, __path_update_ticket, attach_document,
    create_ticket, get_ticket, get_ticket_by_number, list_tickets, transition_ticket,
    update_ticket,
};
