pub mod codec;
pub mod entry;
pub mod normalize;
pub mod settings;
pub mod trie;

pub use codec::{pack, unpack, FormatError, PackOptions, ParsedTrie};
pub use entry::Entry;
pub use normalize::CaseMode;
pub use trie::{CharTrie, PrefixIndex, RadixTrie};
