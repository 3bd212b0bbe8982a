pub mod symbol_repository;

pub use symbol_repository::SymbolRepository;
