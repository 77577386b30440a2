//! Demo catalogue
//!
//! Fills an empty inventory with a small HVAC parts catalogue.

use crate::database::{ItemFields, Repository};
use crate::error::Result;

/// (name, category, qty, min_qty, location, notes)
const DEMO_ITEMS: &[(&str, &str, i64, i64, &str, &str)] = &[
    ("Compressor 12.000 BTUs", "Compressores", 4, 2, "Prateleira A1", "Rotativo - Gás R-410A. Marca Embraco."),
    ("Compressor 18.000 BTUs", "Compressores", 1, 2, "Prateleira A1", "Rotativo - Gás R-22. Verificar disponibilidade com fornecedor."),
    ("Compressor 24.000 BTUs", "Compressores", 3, 1, "Prateleira A2", "Scroll - Gás R-410A. Copeland."),
    ("Correia A-42", "Correias", 12, 5, "Gaveta B3", "Uso em motores de ventilação das condensadoras."),
    ("Correia A-55", "Correias", 3, 5, "Gaveta B3", "Para fan coils de grande porte."),
    ("Correia B-68", "Correias", 7, 3, "Gaveta B4", "Uso geral em motores trifásicos."),
    ("Motor Ventilador 1/4 CV", "Motores", 2, 1, "Depósito 2", "Motor monofásico 220V. Eixo 12mm."),
    ("Motor Ventilador 1/2 CV", "Motores", 0, 1, "Depósito 2", "ESGOTADO - Fazer pedido urgente! Motor trifásico 380V."),
    ("Motor Ventilador 1 CV", "Motores", 1, 1, "Depósito 2", "Trifásico 380V. WEG W22."),
    ("Hélice 400mm 3 Pás", "Hélices", 6, 3, "Prateleira C1", "Plástico reforçado. Encaixe eixo 12mm."),
    ("Hélice 500mm 5 Pás", "Hélices", 2, 2, "Prateleira C1", "Alumínio. Para condensadoras de grande porte."),
    ("Capacitor 25µF", "Componentes Elétricos", 15, 5, "Gaveta D1", "440V. Uso em motores monofásicos de compressor."),
    ("Contator Tripolar 25A", "Componentes Elétricos", 4, 2, "Gaveta D2", "Bobina 220V. Schneider LC1D25."),
    ("Filtro Secador 3/8\"", "Componentes Frigorígenos", 8, 4, "Prateleira E1", "Solda. Para linhas de líquido até 3TR."),
    ("Gás Refrigerante R-410A (11,3kg)", "Componentes Frigorígenos", 2, 3, "Depósito 3 - Área ventilada", "Cilindro descartável. Conferir validade na etiqueta."),
];

/// Insert the demo catalogue if no items exist yet. Returns how many were inserted.
pub async fn seed_demo_items(repo: &Repository) -> Result<usize> {
    if repo.count_items().await? > 0 {
        tracing::debug!("Inventory not empty, skipping demo seed");
        return Ok(0);
    }

    for &(name, category, qty, min_qty, location, notes) in DEMO_ITEMS {
        repo.create_item(&ItemFields {
            name: name.to_string(),
            category: category.to_string(),
            qty,
            min_qty,
            location: location.to_string(),
            notes: notes.to_string(),
        })
        .await?;
    }

    tracing::info!("Seeded {} demo stock items", DEMO_ITEMS.len());

    Ok(DEMO_ITEMS.len())
}
