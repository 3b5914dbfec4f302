pub mod a3ds;
