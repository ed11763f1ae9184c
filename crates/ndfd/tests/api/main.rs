mod daily_summary;
mod helpers;
mod local_files;
