pub mod nuclei;
