mod resident_dto;

pub use resident_dto::{ResidentLookupDto, ResolveResidentQuery};
