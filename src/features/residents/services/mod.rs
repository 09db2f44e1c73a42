mod http_resident_directory;
mod resident_directory;

pub use http_resident_directory::HttpResidentDirectory;
pub use resident_directory::ResidentDirectory;
