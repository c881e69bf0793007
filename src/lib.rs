//! img2speech — image → caption → short story → spoken narration.
//!
//! Three stateless stages run one after another against remote inference
//! backends:
//!
//! * [`caption`] — vision-to-text captioning of the uploaded image.
//! * [`story`] — a short story written from the caption by a language model.
//! * [`speech`] — text-to-speech synthesis of the story.
//!
//! [`pipeline::PipelineRunner`] exposes each stage on its own and the full
//! run; [`backends::Backends`] holds the backend handles, built once.

pub mod backends;
pub mod caption;
pub mod cli;
pub mod config;
pub mod input;
pub mod pipeline;
pub mod speech;
pub mod story;

#[cfg(test)]
mod test_server;
