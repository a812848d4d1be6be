pub mod service;

pub use service::CrewService;
