mod common;

mod pagination_fetch;
