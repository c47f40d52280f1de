pub mod voter_csv;
