//! Test Helper Utilities
//!
//! Shared utilities for testing fleetops-si

#![allow(dead_code)]

pub mod fake_store;
pub mod test_app;

pub use fake_store::{FakeStore, StoreCall};
pub use test_app::{create_test_app, create_test_pool};

/// Shifts file with a header and the given data lines
pub fn shifts_csv(lines: &[&str]) -> String {
    csv_with_header("Sucursal,Nombre,Hora Inicio,Hora Fin,Día Libre", lines)
}

/// Assignments file with a header and the given data lines
pub fn assignments_csv(lines: &[&str]) -> String {
    csv_with_header("Conductor,Turno,Fecha Inicio,Fecha Fin,Prioridad", lines)
}

fn csv_with_header(header: &str, lines: &[&str]) -> String {
    let mut csv = String::from(header);
    for line in lines {
        csv.push('\n');
        csv.push_str(line);
    }
    csv.push('\n');
    csv
}
