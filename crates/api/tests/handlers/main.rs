mod booking_test;
mod middleware_test;
mod sessions_test;
mod test_utils;
