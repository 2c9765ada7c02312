// Output formatting: terminal display of batch results.

pub mod terminal;
