// src/report/pdf.rs
//
// Plain paginated rendering of the enriched rows. Letter-size pages,
// builtin Helvetica, fixed column offsets. Deliberately unstyled.

use chrono::{NaiveDate, NaiveDateTime};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::report::enrich::CitaEnriquecida;

const PAGE_WIDTH: f32 = 215.9; // letter, in mm
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_BOTTOM: f32 = 20.0;
const LINE_HEIGHT: f32 = 6.0;

// fecha, hora, atleta, profesional, consultorio, estado
const COLUMNS: [(&str, f32); 6] = [
    ("Fecha", 0.0),
    ("Hora", 24.0),
    ("Atleta", 42.0),
    ("Profesional", 90.0),
    ("Consultorio", 138.0),
    ("Estado", 168.0),
];

struct Cursor {
    layer: PdfLayerReference,
    y: f32,
}

fn new_page(doc: &PdfDocumentReference) -> Cursor {
    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Contenido");
    Cursor {
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT - 20.0,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

pub fn render_report(
    citas: &[CitaEnriquecida],
    desde: NaiveDate,
    hasta: NaiveDate,
    generado: NaiveDateTime,
) -> Result<Vec<u8>, printpdf::Error> {
    let (doc, page1, layer1) =
        PdfDocument::new("Reporte de Citas", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Contenido");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut cursor = Cursor {
        layer: doc.get_page(page1).get_layer(layer1),
        y: PAGE_HEIGHT - 20.0,
    };

    // Header
    write_line(&mut cursor, &bold, 16.0, "Reporte de Citas Médicas");
    write_line(
        &mut cursor,
        &font,
        9.0,
        &format!("Generado el: {}", generado.format("%d/%m/%Y %H:%M")),
    );
    cursor.y -= LINE_HEIGHT;

    // Applied filters
    write_line(&mut cursor, &bold, 12.0, "Filtros Aplicados:");
    write_line(
        &mut cursor,
        &font,
        10.0,
        &format!(
            "Período: {} - {}",
            desde.format("%d/%m/%Y"),
            hasta.format("%d/%m/%Y")
        ),
    );
    cursor.y -= LINE_HEIGHT;

    // Status summary over the rendered rows
    let mut completadas = 0usize;
    let mut pendientes = 0usize;
    let mut canceladas = 0usize;
    let mut confirmadas = 0usize;
    for cita in citas {
        match cita.estado() {
            "Completada" => completadas += 1,
            "Pendiente" => pendientes += 1,
            "Cancelada" => canceladas += 1,
            "Confirmada" => confirmadas += 1,
            _ => {}
        }
    }
    write_line(&mut cursor, &bold, 12.0, "Resumen Estadístico:");
    write_line(
        &mut cursor,
        &font,
        10.0,
        &format!(
            "Total: {}   Completadas: {}   Pendientes: {}   Canceladas: {}   Confirmadas: {}",
            citas.len(),
            completadas,
            pendientes,
            canceladas,
            confirmadas
        ),
    );
    cursor.y -= LINE_HEIGHT;

    // Detail table
    if citas.is_empty() {
        write_line(
            &mut cursor,
            &font,
            10.0,
            "No se encontraron citas que cumplan con los criterios de filtrado.",
        );
    } else {
        write_line(&mut cursor, &bold, 12.0, "Detalle de Citas:");
        write_row(
            &cursor,
            &bold,
            &COLUMNS.map(|(titulo, _)| titulo.to_string()),
        );
        cursor.y -= LINE_HEIGHT;

        for cita in citas {
            if cursor.y < MARGIN_BOTTOM {
                cursor = new_page(&doc);
                write_row(
                    &cursor,
                    &bold,
                    &COLUMNS.map(|(titulo, _)| titulo.to_string()),
                );
                cursor.y -= LINE_HEIGHT;
            }
            write_row(
                &cursor,
                &font,
                &[
                    cita.fecha_formateada.clone(),
                    cita.hora_formateada.clone(),
                    truncate(&cita.atleta_nombre, 26),
                    truncate(&cita.profesional_nombre, 26),
                    truncate(&cita.consultorio_nombre, 16),
                    truncate(cita.estado(), 14),
                ],
            );
            cursor.y -= LINE_HEIGHT;
        }
    }

    // Footer
    cursor.y -= LINE_HEIGHT;
    if cursor.y < MARGIN_BOTTOM {
        cursor = new_page(&doc);
    }
    write_line(
        &mut cursor,
        &font,
        8.0,
        "Este reporte fue generado automáticamente por el Sistema de Gestión de Citas Médicas.",
    );

    doc.save_to_bytes()
}

fn write_line(cursor: &mut Cursor, font: &IndirectFontRef, size: f32, text: &str) {
    cursor
        .layer
        .use_text(text, size, Mm(MARGIN_LEFT), Mm(cursor.y), font);
    cursor.y -= LINE_HEIGHT;
}

fn write_row(cursor: &Cursor, font: &IndirectFontRef, cells: &[String; 6]) {
    for (cell, (_, offset)) in cells.iter().zip(COLUMNS) {
        cursor
            .layer
            .use_text(cell, 8.0, Mm(MARGIN_LEFT + offset), Mm(cursor.y), font);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::enrich::enrich_citas;
    use crate::report::resolve::{Catalogs, build_index};
    use serde_json::json;

    fn fila() -> CitaEnriquecida {
        let catalogs = Catalogs {
            atletas: build_index(&[]),
            areas: build_index(&[]),
            consultorios: build_index(&[]),
            profesionales: build_index(&[]),
        };
        enrich_citas(
            &[json!({"id": 1, "creado_el": "2025-03-10T08:30:00Z", "estado": "Pendiente"})],
            &catalogs,
        )
        .remove(0)
    }

    #[test]
    fn renders_a_nonempty_pdf_document() {
        let bytes = render_report(
            &[fila()],
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap().and_hms_opt(9, 0, 0).unwrap(),
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_batch_still_renders() {
        let bytes = render_report(
            &[],
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap().and_hms_opt(9, 0, 0).unwrap(),
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_batches_paginate() {
        let filas: Vec<CitaEnriquecida> = (0..120).map(|_| fila()).collect();
        let bytes = render_report(
            &filas,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap().and_hms_opt(9, 0, 0).unwrap(),
        )
        .unwrap();
        assert!(bytes.len() > 4_000);
    }
}
