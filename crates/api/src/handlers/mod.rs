pub mod chat;
pub mod editor;
