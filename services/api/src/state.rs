//! Shared application state

use std::path::PathBuf;

use sqlx::PgPool;

use crate::middleware::TokenVerifier;
use crate::repositories::{
    AccountRepository, BranchRepository, MaterialRepository, NoticeRepository,
    SubjectRepository, TimetableRepository,
};

/// State shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub verifier: TokenVerifier,
    pub accounts: AccountRepository,
    pub branches: BranchRepository,
    pub subjects: SubjectRepository,
    pub notices: NoticeRepository,
    pub timetables: TimetableRepository,
    pub materials: MaterialRepository,
    /// Directory uploaded files are written to and served from
    pub media_dir: PathBuf,
}
