//! Stage workers: the concrete work a `q-sync`/`q-build`/
//! `q-index` job id names.
//!
//! Each stage is a plain async function taking whatever dependencies it
//! needs (spec's own split: sync talks to the source and the object store,
//! the build stages are pure transforms over what sync persisted, index
//! talks to the embedder and vector store). [`StageContext`] bundles them
//! for [`run_stage_job`], the dispatcher the flow-draining loop calls.

use std::collections::HashMap;

use chrono::Utc;
use norma_core::entities::{Norma, Unidad, UnidadMetadata, Version};
use norma_core::enums::StageName;
use norma_core::ids;
use norma_db::NormaDb;
use norma_embed::Embedder;
use norma_parser::bloque_xml::{parse_bloque_xml, VersionSlice};
use norma_parser::index_xml::parse_index_xml;
use norma_parser::BlockDescriptor;
use norma_store::ObjectStore;
use norma_vector::client::VectorStoreClient;
use norma_vector::indexer::{run_indexer, IndexerOptions};

use crate::config::OrchestratorConfig;
use crate::error::OrchestratorError;
use crate::flow::Queues;
use crate::queue::StageJob;

/// Everything a stage worker needs, bundled so `norma-cli`'s `pipeline`
/// binary can build one and hand it to [`run_stage_job`] in a loop.
pub struct StageContext {
    pub db: NormaDb,
    pub source: norma_source::SourceClient,
    pub store: ObjectStore,
    pub embedder: Embedder,
    pub vector: VectorStoreClient,
    pub config: OrchestratorConfig,
}

/// Run one job to completion: skip if its stage is already `ok`, otherwise
/// `mark_stage_start`, dispatch to the stage's implementation, and
/// `mark_stage_success`/`mark_stage_failure` plus the matching queue ack.
pub async fn run_stage_job(ctx: &StageContext, queues: &Queues, job: StageJob) {
    let now = Utc::now();

    if let Ok(Some(state)) = ctx.db.find_sync_state(&job.id_norma).await {
        if state.stage(job.stage).status == norma_core::enums::StageStatus::Ok {
            queues.ack_success(&job).await;
            return;
        }
    }

    if let Err(err) = ctx.db.mark_stage_start(&job.id_norma, job.stage, now).await {
        tracing::error!(id_norma = %job.id_norma, stage = job.stage.as_str(), error = %err, "failed to mark stage start");
        return;
    }

    let result = match job.stage {
        StageName::Sync => run_sync_stage(ctx, &job.id_norma).await,
        StageName::BuildUnits => run_build_units_stage(ctx, &job.id_norma).await,
        StageName::BuildChunks => run_build_chunks_stage(ctx, &job.id_norma).await,
        StageName::Index => run_index_stage(ctx, &job.id_norma).await,
    };

    let finished_at = Utc::now();
    match result {
        Ok(()) => {
            let _ = ctx.db.mark_stage_success(&job.id_norma, job.stage, finished_at).await;
            queues.ack_success(&job).await;
        }
        Err(err) => {
            let _ = ctx.db.mark_stage_failure(&job.id_norma, job.stage, err.to_string(), finished_at).await;
            if let Some(delay) = queues.ack_failure(job).await {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Fetch the norm's index and every block's bloque-XML, persisting each new
/// snapshot to the object store and filling in `Version.texto_plano`/
/// `texto_hash` as a sync-time "legacy v1 chunks" convenience — the real
/// `build_units`/`build_chunks` pipeline reconstructs its own text instead
/// of trusting this column.
pub async fn run_sync_stage(ctx: &StageContext, id_norma: &str) -> Result<(), OrchestratorError> {
    let now = Utc::now();
    let raw_index_xml = ctx.source.fetch_index_xml(id_norma).await?;
    let indice = parse_index_xml(&raw_index_xml)?;

    let hash_xml = ids::content_hash_str(&raw_index_xml);
    let date_token = indice.fecha_actualizacion_raw.as_deref().unwrap_or("unknown");
    let write_result = ctx.store.write_indice(id_norma, date_token, &raw_index_xml)?;
    let id_indice = ids::id_indice(id_norma, indice.fecha_actualizacion_raw.as_deref(), &hash_xml);
    let indice_row = norma_core::entities::Indice {
        id_indice: id_indice.clone(),
        id_norma: id_norma.to_string(),
        fecha_actualizacion: indice
            .fecha_actualizacion_raw
            .as_deref()
            .and_then(|raw| norma_parser::dates::parse_wire_any(raw).ok()),
        fecha_actualizacion_raw: indice.fecha_actualizacion_raw.clone(),
        hash_xml: write_result.pretty_hash.clone(),
        hash_pretty: write_result.pretty_hash.clone(),
        file_path: write_result.relative_path.to_string_lossy().into_owned(),
        is_latest: false,
        created_at: now,
        last_seen_at: now,
    };
    ctx.db.insert_indice_if_missing(&indice_row).await?;
    ctx.db.mark_indice_latest(id_norma, &id_indice).await?;

    for block in &indice.bloques {
        sync_one_bloque(ctx, id_norma, block, now).await?;
    }

    Ok(())
}

async fn sync_one_bloque(
    ctx: &StageContext,
    id_norma: &str,
    block: &BlockDescriptor,
    now: chrono::DateTime<Utc>,
) -> Result<(), OrchestratorError> {
    let candidate = norma_core::entities::Bloque {
        id_bloque_row: ids::id_bloque_row(id_norma, &block.id_bloque),
        id_norma: id_norma.to_string(),
        id_bloque: block.id_bloque.clone(),
        tipo: block.tipo.clone(),
        titulo: block.titulo.clone(),
        fecha_actualizacion_raw: block.fecha_actualizacion_raw.clone(),
        url: block.url.clone(),
        latest_version_id: None,
        created_at: now,
        last_seen_at: now,
    };
    let dirty = ctx.db.upsert_bloque(&candidate, now).await?;
    if !dirty {
        return Ok(());
    }

    let Some(raw_bloque_xml) = ctx.source.fetch_bloque_xml(id_norma, &block.id_bloque).await? else {
        return Ok(());
    };

    if ctx.config.store_raw_snapshots {
        let timestamp_token = now.format("%Y%m%dT%H%M%S").to_string();
        ctx.store.write_raw_snapshot(id_norma, &block.id_bloque, &timestamp_token, &raw_bloque_xml)?;
    }

    let document = parse_bloque_xml(&raw_bloque_xml)?;

    let mut latest: Option<(String, &str)> = None;
    for slice in &document.versions {
        let id_version = sync_one_version(ctx, id_norma, &block.id_bloque, slice, now).await?;
        let token = slice.fecha_vigencia_raw.as_deref().unwrap_or("");
        if latest.as_ref().is_none_or(|(_, current)| token >= *current) {
            latest = Some((id_version, token));
        }
    }

    if let Some((latest_id, _)) = latest {
        ctx.db.mark_version_latest(id_norma, &block.id_bloque, &latest_id).await?;
        ctx.db.set_bloque_latest_version(id_norma, &block.id_bloque, &latest_id).await?;
    }

    Ok(())
}

async fn sync_one_version(
    ctx: &StageContext,
    id_norma: &str,
    id_bloque: &str,
    slice: &VersionSlice,
    now: chrono::DateTime<Utc>,
) -> Result<String, OrchestratorError> {
    let hash_xml = ids::content_hash_str(&slice.raw_xml);
    let vigencia_token = slice.fecha_vigencia_raw.as_deref().unwrap_or("unknown");
    let id_version = ids::id_version(
        id_norma,
        id_bloque,
        vigencia_token,
        slice.id_norma_modificadora.as_deref(),
        &hash_xml,
    );

    if ctx.db.find_version(&id_version).await?.is_some() {
        ctx.db.touch_version(&id_version, now).await?;
        return Ok(id_version);
    }

    let write_result = ctx.store.write_version(
        id_norma,
        id_bloque,
        vigencia_token,
        slice.fecha_publicacion_raw.as_deref(),
        &slice.raw_xml,
    )?;

    let texto_plano = norma_semantic::text::strip_xml_tags(&slice.raw_xml);
    let texto_hash = ids::content_hash_str(&texto_plano);
    let chunking = ctx.config.chunking();

    let version = Version {
        id_version: id_version.clone(),
        id_norma: id_norma.to_string(),
        id_bloque: id_bloque.to_string(),
        fecha_vigencia: slice.fecha_vigencia_raw.as_deref().and_then(|raw| norma_parser::dates::parse_wire_any(raw).ok()),
        fecha_vigencia_raw: slice.fecha_vigencia_raw.clone(),
        fecha_publicacion: slice.fecha_publicacion_raw.as_deref().and_then(|raw| norma_parser::dates::parse_wire_any(raw).ok()),
        fecha_publicacion_raw: slice.fecha_publicacion_raw.clone(),
        id_norma_modificadora: slice.id_norma_modificadora.clone(),
        hash_xml: write_result.pretty_hash.clone(),
        file_path: write_result.relative_path.to_string_lossy().into_owned(),
        texto_plano: Some(texto_plano.clone()),
        texto_hash: Some(texto_hash.clone()),
        chunking_method: Some(chunking.method.as_str().to_string()),
        chunking_size: Some(chunking.chunk_size as i64),
        chunking_overlap: Some(chunking.overlap as i64),
        is_latest: false,
        created_at: now,
        last_seen_at: now,
    };
    ctx.db.insert_version_if_missing(&version).await?;
    ctx.db
        .upsert_version_rag_fields(&id_version, &texto_plano, &texto_hash, chunking.method.as_str(), chunking.chunk_size as i64, chunking.overlap as i64)
        .await?;

    Ok(id_version)
}

/// Rebuild a norm's semantic units from what sync persisted, re-reading the
/// index and every version's XML straight from the object store rather
/// than the sync stage's `texto_plano` shortcut.
pub async fn run_build_units_stage(ctx: &StageContext, id_norma: &str) -> Result<(), OrchestratorError> {
    let now = Utc::now();
    let indice = ctx.db.latest_indice(id_norma).await?.ok_or_else(|| OrchestratorError::MissingInput {
        id_norma: id_norma.to_string(),
        message: "no indice synced yet".to_string(),
    })?;
    let raw_index_xml = read_store_file(ctx, &indice.file_path).await?;
    let document = parse_index_xml(&raw_index_xml)?;

    let mut versions_by_bloque: HashMap<String, Vec<VersionSlice>> = HashMap::new();
    for block in &document.bloques {
        let versions = ctx.db.list_versions(id_norma, &block.id_bloque).await?;
        let mut slices = Vec::with_capacity(versions.len());
        for version in versions {
            let raw_xml = read_store_file(ctx, &version.file_path).await?;
            slices.push(VersionSlice {
                fecha_vigencia_raw: version.fecha_vigencia_raw,
                fecha_publicacion_raw: version.fecha_publicacion_raw,
                id_norma_modificadora: version.id_norma_modificadora,
                raw_xml,
            });
        }
        versions_by_bloque.insert(block.id_bloque.clone(), slices);
    }

    let norma = ctx.db.get_norma(id_norma).await?;
    let metadata = build_unidad_metadata(ctx, &norma).await?;

    let candidates = norma_semantic::build_candidates(id_norma, &document.bloques, &versions_by_bloque, &metadata, now);
    let finalized = norma_semantic::finalize(candidates);

    let mut by_lineage: HashMap<String, Vec<Unidad>> = HashMap::new();
    for unidad in finalized {
        by_lineage.entry(unidad.lineage_key.clone()).or_default().push(unidad);
    }

    for (lineage_key, units) in &by_lineage {
        for unit in units {
            ctx.db.upsert_unidad(unit).await?;
        }
        let closure = norma_semantic::derive_closure(units);
        ctx.db.apply_vigencia_closure(lineage_key, &closure).await?;
        let keep_ids: Vec<String> = units.iter().map(|u| u.id_unidad.clone()).collect();
        ctx.db.delete_unidades_not_in(lineage_key, &keep_ids).await?;
    }

    for stale_lineage in ctx.db.distinct_lineage_keys(id_norma).await? {
        if !by_lineage.contains_key(&stale_lineage) {
            ctx.db.delete_unidades_not_in(&stale_lineage, &[]).await?;
        }
    }

    Ok(())
}

async fn build_unidad_metadata(ctx: &StageContext, norma: &Norma) -> Result<UnidadMetadata, OrchestratorError> {
    let territorio = ctx.db.find_territorio(&norma.territorio_codigo).await?;
    Ok(UnidadMetadata {
        territorio_codigo: Some(norma.territorio_codigo.clone()),
        territorio_tipo: territorio.as_ref().map(|t| t.tipo.to_string()),
        territorio_nombre: territorio.map(|t| t.nombre),
        rango_texto: norma.rango_texto.clone(),
        ambito_texto: norma.ambito_texto.clone(),
        departamento_texto: norma.departamento_texto.clone(),
        url_html_consolidada: norma.url_consolidated.clone(),
        url_eli: None,
        tags: Vec::new(),
    })
}

async fn read_store_file(ctx: &StageContext, relative_path: &str) -> Result<String, OrchestratorError> {
    let absolute = ctx.store.root().join(relative_path);
    tokio::fs::read_to_string(&absolute).await.map_err(|source| {
        OrchestratorError::Other(anyhow::anyhow!("reading object-store file {}: {source}", absolute.display()))
    })
}

/// Chunk every unit of a norm, invalidating chunks produced under a stale
/// chunking configuration.
pub async fn run_build_chunks_stage(ctx: &StageContext, id_norma: &str) -> Result<(), OrchestratorError> {
    let now = Utc::now();
    let chunking = ctx.config.chunking();
    let chunking_hash = chunking.chunking_hash();

    for lineage_key in ctx.db.distinct_lineage_keys(id_norma).await? {
        for unit in ctx.db.list_unidades_by_lineage(&lineage_key).await? {
            ctx.db.delete_chunks_with_stale_hash(&unit.id_unidad, &chunking_hash).await?;

            let chunks = norma_chunk::build_chunks_for_unit(&unit, chunking, now);
            for chunk in &chunks {
                ctx.db.upsert_chunk(chunk).await?;
            }
            let keep_ids: Vec<String> = chunks.iter().map(|c| c.id_chunk.clone()).collect();
            ctx.db.delete_chunks_not_in(&unit.id_unidad, &chunking_hash, &keep_ids).await?;
        }
    }

    Ok(())
}

/// Embed and upsert the norm's chunks into the vector store.
pub async fn run_index_stage(ctx: &StageContext, id_norma: &str) -> Result<(), OrchestratorError> {
    run_indexer(&ctx.db, &ctx.embedder, &ctx.vector, Some(id_norma), IndexerOptions::default()).await?;
    Ok(())
}
