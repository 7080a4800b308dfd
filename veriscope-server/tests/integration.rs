mod helpers;
mod startup_works;
