//! Error types for the editor

use thiserror::Error;

use crate::page::PageId;

/// Boxed collaborator error
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Reconstruction error: {0}")]
    Reconstruction(#[from] ReconstructionError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Save error: {0}")]
    Save(#[from] SaveError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Page not found: {0}")]
    UnknownPage(PageId),

    #[error("Pages are locked while a save is in progress")]
    Locked,
}

/// The source document could not be turned into pages
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to render source '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: BoxError,
    },
}

/// Pipeline step that failed during reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconstructionStage {
    OpenSource,
    CreateDocument,
    CopyPage { original_index: usize },
    ReadRotation { original_index: usize },
    SetRotation { original_index: usize },
    AppendPage { original_index: usize },
    Serialize,
}

impl std::fmt::Display for ReconstructionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenSource => write!(f, "opening source document"),
            Self::CreateDocument => write!(f, "creating output document"),
            Self::CopyPage { original_index } => write!(f, "copying source page {}", original_index),
            Self::ReadRotation { original_index } => {
                write!(f, "reading rotation of source page {}", original_index)
            }
            Self::SetRotation { original_index } => {
                write!(f, "rotating source page {}", original_index)
            }
            Self::AppendPage { original_index } => {
                write!(f, "appending source page {}", original_index)
            }
            Self::Serialize => write!(f, "serializing output document"),
        }
    }
}

/// The plan names a page the parsed source does not have
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Source has {count} pages, no page {index}")]
pub struct MissingSourcePage {
    pub index: usize,
    pub count: usize,
}

/// Save aborted; the page collection is unchanged and the save can be retried.
#[derive(Error, Debug)]
#[error("Failed while {stage}: {source}")]
pub struct ReconstructionError {
    pub stage: ReconstructionStage,
    #[source]
    pub source: BoxError,
}

impl ReconstructionError {
    pub(crate) fn at<E>(stage: ReconstructionStage) -> impl FnOnce(E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |e| Self {
            stage,
            source: Box::new(e),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No document is loaded")]
    NoSession,

    #[error("A save is already in progress")]
    SaveInProgress,
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Refusing to overwrite existing file: {0}")]
    AlreadyExists(std::path::PathBuf),
}
