//! Landmark-based registration of spatial elements.
//!
//! Two elements annotated with corresponding landmark points (or circles)
//! can be brought into a shared coordinate system:
//! [`estimate_transformation`] fits the similarity carrying the moving
//! landmarks onto the reference landmarks, correcting for mirrored
//! correspondences with an explicit flip, and
//! [`align_elements_using_landmarks`] installs the composed result on both
//! elements.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod fit;
mod landmark;

pub use error::{RegistrationError, RegistrationResult};
pub use fit::{fit_affine, fit_similarity};
pub use landmark::{align_elements_using_landmarks, estimate_transformation, landmark_points};
