//! View builders for the list and detail pages

mod detail;
mod list;

pub use detail::{
    count_block_words, estimate_read_minutes, DetailPage, PostView, RenderedBlock,
    WORDS_PER_MINUTE,
};
pub use list::{ListView, LoadMore, Pagination, LOAD_MORE_NOTICE};
