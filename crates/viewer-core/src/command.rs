use std::path::PathBuf;

/// User actions, as the GUI reports them. Each one maps to exactly one
/// synchronous controller call via [`crate::ViewerController::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectFile(PathBuf),
    NextPage,
    PrevPage,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    FilterChanged(String),
    ExpandDir(PathBuf),
    CollapseDir(PathBuf),
    Shutdown,
}
