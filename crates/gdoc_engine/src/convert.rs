use gdoc_core::{
    build_embed, build_paragraph, build_table, build_title, Embed, RichTextDocument,
    SourceDocument, StructuralElement,
};
use import_logging::import_warn;

use crate::assets::{AssetError, AssetResolver, Resolved};
use crate::{ImportEvent, ProgressSink, SkipReason, SkippedElement};

/// Output of one pass over a source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    pub document: RichTextDocument,
    pub skipped: Vec<SkippedElement>,
    /// Image objects referenced by the document, in first-use order.
    pub assets: Vec<Resolved>,
}

/// Routes every element to its builder and appends the result in source order.
///
/// Unknown elements and images that cannot be resolved are recorded in
/// [`Conversion::skipped`]; they never stop the pass.
pub async fn convert_document(
    source: &SourceDocument,
    resolver: &mut AssetResolver,
    sink: &dyn ProgressSink,
) -> Conversion {
    let mut conversion = Conversion::default();

    for (index, element) in source.elements.iter().enumerate() {
        match element {
            StructuralElement::Heading { level, runs } => {
                conversion.document.push(build_title(level, runs));
            }
            StructuralElement::Image {
                inline_object_id, ..
            } => match build_image(source, inline_object_id, resolver, sink).await {
                Ok((embed, resolved)) => {
                    conversion.document.push(embed);
                    if !conversion
                        .assets
                        .iter()
                        .any(|known| known.object().id == resolved.object().id)
                    {
                        conversion.assets.push(resolved);
                    }
                }
                Err(err) => {
                    let skipped = SkippedElement {
                        index,
                        kind: element.kind_name().to_string(),
                        reason: SkipReason::AssetFailed {
                            message: err.to_string(),
                        },
                    };
                    import_warn!("Skipping image {}: {}", inline_object_id, err);
                    sink.emit(ImportEvent::ElementSkipped(skipped.clone()));
                    conversion.skipped.push(skipped);
                }
            },
            StructuralElement::Table { rows } => {
                conversion.document.push(build_table(rows));
            }
            StructuralElement::Paragraph { runs } => {
                if let Some(paragraph) = build_paragraph(runs) {
                    conversion.document.push(paragraph);
                }
            }
            StructuralElement::Unknown { kind } => {
                let skipped = SkippedElement {
                    index,
                    kind: kind.clone(),
                    reason: SkipReason::Unsupported,
                };
                import_warn!("Import for element #{} ({}) not implemented", index, kind);
                sink.emit(ImportEvent::ElementSkipped(skipped.clone()));
                conversion.skipped.push(skipped);
            }
        }
    }

    conversion
}

async fn build_image(
    source: &SourceDocument,
    inline_object_id: &str,
    resolver: &mut AssetResolver,
    sink: &dyn ProgressSink,
) -> Result<(Embed, Resolved), AssetError> {
    let object = source
        .inline_object(inline_object_id)
        .ok_or_else(|| AssetError::MissingInlineObject(inline_object_id.to_string()))?;
    let content_uri = object
        .content_uri
        .as_deref()
        .ok_or_else(|| AssetError::MissingContentUri(inline_object_id.to_string()))?;

    let resolved = resolver.resolve(inline_object_id, content_uri).await?;
    let asset = resolved.object();
    sink.emit(match &resolved {
        Resolved::Created(_) => ImportEvent::AssetCreated {
            remote_id: asset.remote_id.clone(),
            content_id: asset.id,
        },
        Resolved::Existing(_) => ImportEvent::AssetReused {
            remote_id: asset.remote_id.clone(),
            content_id: asset.id,
        },
    });

    Ok((build_embed(asset.id), resolved))
}
