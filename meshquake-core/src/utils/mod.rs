pub mod local_time;
