pub mod date_set;
