mod registry_tests;
mod models_tests;
