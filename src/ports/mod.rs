pub mod fake_data;
