//! Prelude module for common tripmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use tripmap::prelude::*;`

pub use crate::core::{
    config::{MarkerIcon, PanelConfig, PanoramaConfig, PathFitOptions, TileLayerOptions},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{Map, MapEvent, MapId, MapOptions},
    viewport::{FitBoundsOptions, Viewport},
};

pub use crate::layers::{
    base::{LayerProperties, LayerTrait, LayerType},
    manager::LayerManager,
    marker::MarkerLayer,
    tile::TileLayer,
    vector::{Color, LineStyle, PolylineLayer},
};

pub use crate::tiles::{HttpTileFetcher, TileCache, TileFetcher, TileLoadReport, TileLoader};

pub use crate::ui::{ControlKind, Popup, PopupAction, PopupContent};

pub use crate::panel::{
    container::{HeadlessContainer, MapContainer},
    lifecycle::{MapLifecycle, MapViewState, MarkerKind, MarkerSpec},
    panorama::{OverlayContent, OverlaySession, PanoramaController, PanoramaState},
    path::{PathRenderer, PathRequest, TransportMode},
    provider::{
        InMemoryScriptHost, PanoramaInfo, PanoramaProvider, PanoramaService, ScriptHost,
        ScriptTagProvider, StaticPanoramaService,
    },
    MapPanel, PanelEvent, PanelProps,
};

pub use crate::data::{markers_for, Place, PlaceCategory, PlaceFilter, PlaceProvider, StaticPlaces};

pub use crate::runtime::{spawners::DeferredSpawner, AsyncHandle, AsyncSpawner};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::spawners::tokio_impl::TokioSpawner;

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
