pub mod processed_record;
