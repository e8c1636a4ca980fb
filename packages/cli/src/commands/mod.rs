pub mod edit;
pub mod show;

pub use edit::{edit, EditArgs, PanelAction};
pub use show::{show, ShowArgs};
