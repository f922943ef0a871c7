pub mod error;
pub mod flags;
pub mod sort_value;
pub mod value;
pub mod view;

pub use error::{AppError, CodePosition};
pub use flags::Flags;
pub use sort_value::{Direction, NullPosition, SortValue, SortValues};
pub use value::{Datetime, Ternary, Value};
pub use view::{
    canonicalize_path, Encoding, FileInfo, Format, Header, HeaderField, JsonEscape, LineBreak,
    Record, Result as MutationResult, ResultType, View,
};
