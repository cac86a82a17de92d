//! Turning a chat message into something worth replying with.
//!
//! Every resolver collapses its failures (network errors, bad status codes,
//! markup that doesn't look the way we expect) into [`Resolution::NotFound`],
//! so callers only ever have to handle the two outcomes.

pub mod search;
pub mod top_list;

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Found(T),
    NotFound,
}

impl<T> From<Option<T>> for Resolution<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(t) => Resolution::Found(t),
            None => Resolution::NotFound,
        }
    }
}
