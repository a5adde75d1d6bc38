pub mod markdown_digest;
