mod build;
mod input;
mod view;
