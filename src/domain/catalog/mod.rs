//! Domain Catalog - the closed, static set of periods and personas.
//!
//! Every entry is a process-wide immutable value. Lookups by typed id
//! ([`PeriodId`], [`PersonaId`]) are total: there is no runtime error path,
//! because the id enums and the static tables describe the same closed set.
//! Only text coming from outside the process (wire names, slider positions)
//! can fail to resolve, and that is reported through [`CatalogError`].

mod error;
mod period;
mod persona;

pub use error::CatalogError;
pub use period::{period_by_id, Period, PeriodId, PERIOD_COUNT};
pub use persona::{persona_by_id, Persona, PersonaId, PERSONA_COUNT};
