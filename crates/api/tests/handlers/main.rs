mod middleware_test;
mod proposal_test;
mod slot_test;
mod test_utils;
