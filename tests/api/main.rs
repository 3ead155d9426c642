mod form;
mod health_check;
mod home;
mod join_waitlist;
