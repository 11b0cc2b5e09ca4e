pub mod code;
pub mod delimiter;
pub mod header;
pub mod list;
pub mod paragraph;
pub mod quote;

pub use code::Code;
pub use delimiter::Delimiter;
pub use header::Header;
pub use list::List;
pub use paragraph::Paragraph;
pub use quote::Quote;
