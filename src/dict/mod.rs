pub mod loader;

pub use loader::{
    build_dictionary, dictionary_info, load_dictionary, resolve_dictionary, save_dictionary,
    DictionaryFormat, DictionaryInfo,
};
