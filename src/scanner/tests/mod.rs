mod container_tests;
mod click_tests;
