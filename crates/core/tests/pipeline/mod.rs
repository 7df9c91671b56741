mod image_format;
mod scenarios;
