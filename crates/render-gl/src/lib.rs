//! OpenGL backend for the waterline renderer.
//!
//! [`GlContext`] implements [`GraphicsContext`](waterline_render::GraphicsContext)
//! on top of a `glow` context supplied by the embedding application. Window
//! and context creation are the caller's job.
//!
//! # Invariants
//! - Every call happens on the thread that owns the current GL context.
//! - Backend handles never leak out; callers only see waterline ids.

mod context;
mod convert;

pub use context::GlContext;
