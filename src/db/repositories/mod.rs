mod points;
mod sessions;
