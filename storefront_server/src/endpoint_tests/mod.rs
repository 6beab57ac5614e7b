mod access;
mod helpers;
mod mocks;
mod orders;
mod points;
