#![allow(dead_code)]

pub mod error;
pub mod quantity;
pub mod fock;
pub mod disorder;
pub mod hamiltonian;
pub mod eigensystem;
pub mod storage;
pub mod analyzer;

pub use error::{ EdError, EdResult };
pub use fock::{ FockVector, FockBasis, FockBasisGenerator };
pub use eigensystem::Eigensystem;
