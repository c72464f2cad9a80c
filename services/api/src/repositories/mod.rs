//! Repositories for database operations

pub mod account;
pub mod branch;
pub mod material;
pub mod notice;
pub mod subject;
pub mod timetable;

pub use account::AccountRepository;
pub use branch::BranchRepository;
pub use material::MaterialRepository;
pub use notice::NoticeRepository;
pub use subject::SubjectRepository;
pub use timetable::TimetableRepository;
