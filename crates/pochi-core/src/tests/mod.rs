mod library;
mod recorder;
