//! Game board representation: tiles, the vertex/edge graph, and ports.
//!
//! This module contains:
//! - Resource, terrain and port types
//! - The board generator (tile shuffle, number tokens, graph, ports)
//! - Placement queries (distance rule, road connectivity)
//! - Production and longest-road calculation
//!
//! Vertices, edges and tiles are addressed by stable integer ids assigned
//! during generation. Their collections are `im::Vector`s, so cloning a
//! board shares structure and a placement only rewrites the touched slot.

use crate::hex::{CubeCoord, EdgeKey, VertexKey};
use crate::rng::GameRng;
use im::Vector;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Player identifier (0-3 for a 4-player game)
pub type PlayerId = u8;
/// Index into the board's tiles
pub type TileId = usize;
/// Index into the board's vertices
pub type VertexId = usize;
/// Index into the board's edges
pub type EdgeId = usize;

pub const TILE_COUNT: usize = 19;
pub const VERTEX_COUNT: usize = 54;
pub const EDGE_COUNT: usize = 72;
pub const PORT_COUNT: usize = 9;

/// Attempts the balanced generator makes before accepting a layout anyway
const MAX_BALANCE_ATTEMPTS: usize = 100;

/// Standard number tokens, one per non-desert tile
const NUMBER_TOKENS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Land hexes in generation order. Ids are assigned by walking this list.
const LAND_COORDS: [CubeCoord; TILE_COUNT] = [
    // Center
    CubeCoord::new(0, 0),
    // Ring 1
    CubeCoord::new(1, 0),
    CubeCoord::new(1, -1),
    CubeCoord::new(0, -1),
    CubeCoord::new(-1, 0),
    CubeCoord::new(-1, 1),
    CubeCoord::new(0, 1),
    // Ring 2
    CubeCoord::new(2, 0),
    CubeCoord::new(2, -1),
    CubeCoord::new(2, -2),
    CubeCoord::new(1, -2),
    CubeCoord::new(0, -2),
    CubeCoord::new(-1, -1),
    CubeCoord::new(-2, 0),
    CubeCoord::new(-2, 1),
    CubeCoord::new(-2, 2),
    CubeCoord::new(-1, 2),
    CubeCoord::new(0, 2),
    CubeCoord::new(1, 1),
];

/// Resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];
}

/// Terrain of a land hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Forest,
    Hills,
    Pasture,
    Fields,
    Mountains,
    Desert,
}

impl Terrain {
    /// The fixed 19-tile terrain multiset
    pub fn standard_set() -> Vec<Terrain> {
        let mut set = Vec::with_capacity(TILE_COUNT);
        set.extend(std::iter::repeat(Terrain::Forest).take(4));
        set.extend(std::iter::repeat(Terrain::Pasture).take(4));
        set.extend(std::iter::repeat(Terrain::Fields).take(4));
        set.extend(std::iter::repeat(Terrain::Hills).take(3));
        set.extend(std::iter::repeat(Terrain::Mountains).take(3));
        set.push(Terrain::Desert);
        set
    }

    /// Get the resource this terrain produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Terrain::Forest => Some(Resource::Wood),
            Terrain::Hills => Some(Resource::Brick),
            Terrain::Pasture => Some(Resource::Sheep),
            Terrain::Fields => Some(Resource::Wheat),
            Terrain::Mountains => Some(Resource::Ore),
            Terrain::Desert => None,
        }
    }
}

/// Port types for maritime trading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    /// 3:1 trade any resource
    Generic,
    /// 2:1 trade for a specific resource
    Specific(Resource),
}

impl PortType {
    /// The exchange rate for this port
    pub fn rate(&self) -> u32 {
        match self {
            PortType::Generic => 3,
            PortType::Specific(_) => 2,
        }
    }

    /// The standard port set: 4 generic and one 2:1 port per resource
    pub fn standard_set() -> Vec<PortType> {
        let mut set = vec![PortType::Generic; 4];
        set.extend(Resource::ALL.map(PortType::Specific));
        set
    }
}

/// A single land hex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexTile {
    pub index: TileId,
    pub coord: CubeCoord,
    pub terrain: Terrain,
    /// Number token (2-12, never 7); `None` for the desert
    pub number: Option<u8>,
}

impl HexTile {
    /// Get the resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        self.terrain.resource()
    }
}

/// Kind of building on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Settlement,
    City,
}

/// A settlement or city and its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Building {
    pub owner: PlayerId,
    pub kind: BuildingKind,
}

impl Building {
    pub fn settlement(owner: PlayerId) -> Self {
        Self {
            owner,
            kind: BuildingKind::Settlement,
        }
    }

    /// Victory points provided by this building
    pub fn victory_points(&self) -> u32 {
        match self.kind {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }

    /// Resource multiplier (how many resources per production)
    pub fn production(&self) -> u32 {
        self.victory_points()
    }
}

/// A corner of the board where settlements and cities are placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    /// Vertices one edge away (distance-rule neighbors)
    pub adjacent_vertices: Vec<VertexId>,
    pub adjacent_edges: Vec<EdgeId>,
    pub adjacent_tiles: Vec<TileId>,
    pub building: Option<Building>,
    pub port: Option<PortType>,
}

/// A side of a hex where roads are placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub vertices: [VertexId; 2],
    pub adjacent_tiles: Vec<TileId>,
    pub road: Option<PlayerId>,
}

impl Edge {
    /// The endpoint that is not `vertex`
    pub fn other_end(&self, vertex: VertexId) -> VertexId {
        if self.vertices[0] == vertex {
            self.vertices[1]
        } else {
            self.vertices[0]
        }
    }

    /// A coastal edge borders exactly one land tile
    pub fn is_coastal(&self) -> bool {
        self.adjacent_tiles.len() == 1
    }
}

/// Port placement on a coastal edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub port_type: PortType,
    pub edge: EdgeId,
    /// The two vertices whose buildings can use this port
    pub vertices: [VertexId; 2],
}

/// The complete game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    tiles: Vector<HexTile>,
    vertices: Vector<Vertex>,
    edges: Vector<Edge>,
    ports: Vec<Port>,
    robber_tile: TileId,
}

/// Generate a standard board, seeded or from entropy.
pub fn generate_board(balanced: bool, seed: Option<u64>) -> Board {
    let mut rng = seed.map(GameRng::new).unwrap_or_else(GameRng::from_entropy);
    Board::generate(balanced, &mut rng)
}

impl Board {
    /// Create the standard board layout with randomized tiles, numbers and ports.
    ///
    /// With `balanced`, number tokens are reshuffled until no 6 or 8 sits next
    /// to another 6 or 8 (bounded by a fixed attempt count).
    pub fn generate<R: Rng + ?Sized>(balanced: bool, rng: &mut R) -> Self {
        let mut terrains = Terrain::standard_set();
        terrains.shuffle(rng);

        let numbers = Self::assign_numbers(&terrains, balanced, rng);

        let tiles: Vector<HexTile> = LAND_COORDS
            .iter()
            .zip(terrains.iter().zip(numbers))
            .enumerate()
            .map(|(index, (coord, (terrain, number)))| HexTile {
                index,
                coord: *coord,
                terrain: *terrain,
                number,
            })
            .collect();

        let robber_tile = terrains
            .iter()
            .position(|t| *t == Terrain::Desert)
            .unwrap_or(0);

        let (vertices, edges) = Self::build_graph();

        let mut board = Self {
            tiles,
            vertices,
            edges,
            ports: Vec::new(),
            robber_tile,
        };
        board.place_ports(rng);

        debug_assert_eq!(board.tiles.len(), TILE_COUNT);
        debug_assert_eq!(board.vertices.len(), VERTEX_COUNT);
        debug_assert_eq!(board.edges.len(), EDGE_COUNT);
        debug_assert_eq!(board.ports.len(), PORT_COUNT);

        debug!(
            robber_tile,
            balanced,
            ports = board.ports.len(),
            "generated board"
        );
        board
    }

    /// Shuffle the token multiset and lay it on the non-desert tiles in order
    fn assign_numbers<R: Rng + ?Sized>(
        terrains: &[Terrain],
        balanced: bool,
        rng: &mut R,
    ) -> Vec<Option<u8>> {
        let mut tokens = NUMBER_TOKENS.to_vec();
        tokens.shuffle(rng);

        if balanced {
            for attempt in 0..MAX_BALANCE_ATTEMPTS {
                let layout = Self::lay_tokens(terrains, &tokens);
                if !Self::has_adjacent_hot_numbers(&layout) {
                    debug!(attempt, "balanced number layout found");
                    return layout;
                }
                tokens.shuffle(rng);
            }
            debug!("no balanced number layout found, keeping last shuffle");
        }

        Self::lay_tokens(terrains, &tokens)
    }

    fn lay_tokens(terrains: &[Terrain], tokens: &[u8]) -> Vec<Option<u8>> {
        let mut next = tokens.iter().copied();
        terrains
            .iter()
            .map(|t| match t {
                Terrain::Desert => None,
                _ => next.next(),
            })
            .collect()
    }

    /// Whether two 6/8 tokens sit on neighboring hexes
    fn has_adjacent_hot_numbers(numbers: &[Option<u8>]) -> bool {
        let hot: HashSet<CubeCoord> = LAND_COORDS
            .iter()
            .zip(numbers)
            .filter(|(_, n)| matches!(n, Some(6) | Some(8)))
            .map(|(c, _)| *c)
            .collect();

        hot.iter()
            .any(|coord| coord.neighbors().iter().any(|n| hot.contains(n)))
    }

    /// Build the vertex/edge graph.
    ///
    /// Pass 1 walks the hexes in order and gives every unseen corner and side
    /// key the next sequential id, so a corner reached from three hexes still
    /// collapses to one vertex. Pass 2 fills in the adjacency lists.
    fn build_graph() -> (Vector<Vertex>, Vector<Edge>) {
        let tile_of: HashMap<CubeCoord, TileId> = LAND_COORDS
            .iter()
            .enumerate()
            .map(|(i, c)| (*c, i))
            .collect();

        let mut vertex_ids: HashMap<VertexKey, VertexId> = HashMap::new();
        let mut vertex_keys: Vec<VertexKey> = Vec::new();
        let mut edge_ids: HashMap<EdgeKey, EdgeId> = HashMap::new();
        let mut edge_keys: Vec<EdgeKey> = Vec::new();
        let mut edge_ends: Vec<[VertexId; 2]> = Vec::new();

        for coord in LAND_COORDS {
            let corners = coord.corner_keys().map(|key| {
                *vertex_ids.entry(key).or_insert_with(|| {
                    vertex_keys.push(key);
                    vertex_keys.len() - 1
                })
            });

            for (side, key) in coord.side_keys().into_iter().enumerate() {
                if edge_ids.contains_key(&key) {
                    continue;
                }
                edge_ids.insert(key, edge_keys.len());
                edge_keys.push(key);
                edge_ends.push([corners[(side + 5) % 6], corners[side]]);
            }
        }

        let on_board = |hexes: &[CubeCoord]| -> Vec<TileId> {
            let mut ids: Vec<TileId> = hexes.iter().filter_map(|h| tile_of.get(h).copied()).collect();
            ids.sort_unstable();
            ids
        };

        let mut vertices: Vec<Vertex> = vertex_keys
            .iter()
            .enumerate()
            .map(|(id, key)| Vertex {
                id,
                adjacent_vertices: Vec::new(),
                adjacent_edges: Vec::new(),
                adjacent_tiles: on_board(&key.hexes()[..]),
                building: None,
                port: None,
            })
            .collect();

        let edges: Vec<Edge> = edge_keys
            .iter()
            .zip(&edge_ends)
            .enumerate()
            .map(|(id, (key, ends))| Edge {
                id,
                vertices: *ends,
                adjacent_tiles: on_board(&key.hexes()[..]),
                road: None,
            })
            .collect();

        for edge in &edges {
            let [a, b] = edge.vertices;
            vertices[a].adjacent_edges.push(edge.id);
            vertices[b].adjacent_edges.push(edge.id);
            vertices[a].adjacent_vertices.push(b);
            vertices[b].adjacent_vertices.push(a);
        }

        (vertices.into_iter().collect(), edges.into_iter().collect())
    }

    /// Choose 9 vertex-disjoint coastal edges and assign a shuffled port set
    fn place_ports<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut coastal: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|e| e.is_coastal())
            .map(|e| e.id)
            .collect();
        coastal.shuffle(rng);

        let mut used: HashSet<VertexId> = HashSet::new();
        let mut selected: Vec<EdgeId> = Vec::with_capacity(PORT_COUNT);
        for edge_id in coastal {
            if selected.len() == PORT_COUNT {
                break;
            }
            let [a, b] = self.edges[edge_id].vertices;
            if used.contains(&a) || used.contains(&b) {
                continue;
            }
            used.insert(a);
            used.insert(b);
            selected.push(edge_id);
        }

        let mut port_types = PortType::standard_set();
        port_types.shuffle(rng);

        for (edge, port_type) in selected.into_iter().zip(port_types) {
            let vertices = self.edges[edge].vertices;
            for v in vertices {
                if let Some(vertex) = self.vertices.get_mut(v) {
                    vertex.port = Some(port_type);
                }
            }
            self.ports.push(Port {
                port_type,
                edge,
                vertices,
            });
        }
    }

    // ==================== Query Methods ====================

    pub fn tiles(&self) -> impl Iterator<Item = &HexTile> {
        self.tiles.iter()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn tile(&self, id: TileId) -> Option<&HexTile> {
        self.tiles.get(id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get the robber's current tile
    pub fn robber_tile(&self) -> TileId {
        self.robber_tile
    }

    /// Get building at a vertex
    pub fn building_at(&self, vertex: VertexId) -> Option<Building> {
        self.vertices.get(vertex).and_then(|v| v.building)
    }

    /// Get road owner at an edge
    pub fn road_at(&self, edge: EdgeId) -> Option<PlayerId> {
        self.edges.get(edge).and_then(|e| e.road)
    }

    /// Vertices touching a tile
    pub fn tile_vertices(&self, tile: TileId) -> Vec<VertexId> {
        self.vertices
            .iter()
            .filter(|v| v.adjacent_tiles.contains(&tile))
            .map(|v| v.id)
            .collect()
    }

    // ==================== Validation Methods ====================

    /// Empty and no building on any neighbor (distance rule)
    pub fn is_vertex_free(&self, vertex: VertexId) -> bool {
        match self.vertices.get(vertex) {
            Some(v) => {
                v.building.is_none()
                    && v
                        .adjacent_vertices
                        .iter()
                        .all(|&adj| self.building_at(adj).is_none())
            }
            None => false,
        }
    }

    /// Whether an edge is an existing vertex's neighbor edge
    pub fn vertex_touches_edge(&self, vertex: VertexId, edge: EdgeId) -> bool {
        self.vertices
            .get(vertex)
            .is_some_and(|v| v.adjacent_edges.contains(&edge))
    }

    /// Settlement spots during setup (no road connection needed)
    pub fn setup_settlement_spots(&self) -> Vec<VertexId> {
        self.vertices
            .iter()
            .filter(|v| self.is_vertex_free(v.id))
            .map(|v| v.id)
            .collect()
    }

    /// Settlement spots during normal play: free and touching the player's road
    pub fn settlement_spots(&self, player: PlayerId) -> Vec<VertexId> {
        self.vertices
            .iter()
            .filter(|v| self.is_vertex_free(v.id) && self.has_own_road_at(v.id, player))
            .map(|v| v.id)
            .collect()
    }

    fn has_own_road_at(&self, vertex: VertexId, player: PlayerId) -> bool {
        self.vertices.get(vertex).is_some_and(|v| {
            v.adjacent_edges
                .iter()
                .any(|&e| self.road_at(e) == Some(player))
        })
    }

    /// Unoccupied edges touching a vertex (setup road choices)
    pub fn open_edges_at(&self, vertex: VertexId) -> Vec<EdgeId> {
        self.vertices
            .get(vertex)
            .map(|v| {
                v.adjacent_edges
                    .iter()
                    .copied()
                    .filter(|&e| self.road_at(e).is_none())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Road spots during normal play: unoccupied and connected to the network
    pub fn road_spots(&self, player: PlayerId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|e| e.road.is_none() && self.is_road_connected(e.id, player))
            .map(|e| e.id)
            .collect()
    }

    /// Check if an edge connects to a player's network.
    ///
    /// An endpoint counts if the player builds there, or if it holds no
    /// opposing building and another of the player's roads meets it.
    pub fn is_road_connected(&self, edge: EdgeId, player: PlayerId) -> bool {
        let Some(edge) = self.edges.get(edge) else {
            return false;
        };
        edge.vertices.iter().any(|&endpoint| {
            match self.building_at(endpoint) {
                Some(b) if b.owner == player => true,
                Some(_) => false,
                None => self.vertices[endpoint]
                    .adjacent_edges
                    .iter()
                    .any(|&adj| adj != edge.id && self.road_at(adj) == Some(player)),
            }
        })
    }

    /// Get valid city upgrade spots for a player
    pub fn city_spots(&self, player: PlayerId) -> Vec<VertexId> {
        self.vertices
            .iter()
            .filter(|v| v.building == Some(Building::settlement(player)))
            .map(|v| v.id)
            .collect()
    }

    /// Ports a player has access to through their buildings
    pub fn ports_for(&self, player: PlayerId) -> Vec<PortType> {
        let mut ports: Vec<PortType> = Vec::new();
        for port in &self.ports {
            let owns = port
                .vertices
                .iter()
                .any(|&v| self.building_at(v).is_some_and(|b| b.owner == player));
            if owns && !ports.contains(&port.port_type) {
                ports.push(port.port_type);
            }
        }
        ports
    }

    /// Players with a building on a tile's corners, sorted
    pub fn players_on_tile(&self, tile: TileId) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self
            .tile_vertices(tile)
            .into_iter()
            .filter_map(|v| self.building_at(v).map(|b| b.owner))
            .collect();
        players.sort_unstable();
        players.dedup();
        players
    }

    // ==================== Mutation Methods ====================
    //
    // These assume the caller already validated the placement.

    /// Place a settlement
    pub fn place_settlement(&mut self, vertex: VertexId, player: PlayerId) {
        if let Some(v) = self.vertices.get_mut(vertex) {
            v.building = Some(Building::settlement(player));
        }
    }

    /// Upgrade a settlement to a city
    pub fn upgrade_to_city(&mut self, vertex: VertexId) {
        if let Some(building) = self.vertices.get_mut(vertex).and_then(|v| v.building.as_mut()) {
            building.kind = BuildingKind::City;
        }
    }

    /// Place a road
    pub fn place_road(&mut self, edge: EdgeId, player: PlayerId) {
        if let Some(e) = self.edges.get_mut(edge) {
            e.road = Some(player);
        }
    }

    /// Move the robber to a new tile
    pub fn move_robber(&mut self, tile: TileId) {
        if tile < self.tiles.len() {
            self.robber_tile = tile;
        }
    }

    // ==================== Resource Distribution ====================

    /// Resources produced for a dice roll as (player, resource, amount).
    ///
    /// The robber's tile and the desert produce nothing.
    pub fn production_for_roll(&self, roll: u8) -> Vec<(PlayerId, Resource, u32)> {
        let mut production = Vec::new();
        for tile in self.tiles.iter() {
            if tile.number != Some(roll) || tile.index == self.robber_tile {
                continue;
            }
            let Some(resource) = tile.resource() else {
                continue;
            };
            for vertex in self.tile_vertices(tile.index) {
                if let Some(building) = self.building_at(vertex) {
                    production.push((building.owner, resource, building.production()));
                }
            }
        }
        production
    }

    // ==================== Longest Road Calculation ====================

    /// Length of the player's longest contiguous road.
    ///
    /// Only the player's own roads are walked, and a path cannot continue
    /// through a vertex holding another player's building.
    pub fn longest_road(&self, player: PlayerId) -> u32 {
        let mut visited = vec![false; self.edges.len()];
        self.vertices
            .iter()
            .filter(|v| self.has_own_road_at(v.id, player))
            .map(|v| self.walk_road(player, v.id, &mut visited))
            .max()
            .unwrap_or(0)
    }

    fn walk_road(&self, player: PlayerId, from: VertexId, visited: &mut [bool]) -> u32 {
        let Some(vertex) = self.vertices.get(from) else {
            return 0;
        };

        let mut best = 0;
        for &edge_id in &vertex.adjacent_edges {
            if visited[edge_id] || self.road_at(edge_id) != Some(player) {
                continue;
            }
            let next = self.edges[edge_id].other_end(from);
            let blocked = self.building_at(next).is_some_and(|b| b.owner != player);

            visited[edge_id] = true;
            let length = 1 + if blocked {
                0
            } else {
                self.walk_road(player, next, visited)
            };
            visited[edge_id] = false;

            best = best.max(length);
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(seed: u64) -> Board {
        Board::generate(false, &mut GameRng::new(seed))
    }

    /// Edge ids of the center hex's sides, in side order
    fn center_ring(board: &Board) -> Vec<EdgeId> {
        board
            .edges()
            .filter(|e| e.adjacent_tiles.contains(&0))
            .map(|e| e.id)
            .collect()
    }

    #[test]
    fn test_standard_board_counts() {
        let board = board(1);
        assert_eq!(board.tile_count(), TILE_COUNT);
        assert_eq!(board.vertex_count(), VERTEX_COUNT);
        assert_eq!(board.edge_count(), EDGE_COUNT);
        assert_eq!(board.ports().len(), PORT_COUNT);
    }

    #[test]
    fn test_interior_and_coastal_counts() {
        let board = board(2);
        let interior = board.vertices().filter(|v| v.adjacent_tiles.len() == 3).count();
        assert_eq!(interior, 24);

        let coastal = board.edges().filter(|e| e.is_coastal()).count();
        assert_eq!(coastal, 30);
    }

    #[test]
    fn test_graph_is_symmetric() {
        let board = board(3);
        for vertex in board.vertices() {
            assert!((2..=3).contains(&vertex.adjacent_vertices.len()));
            assert_eq!(vertex.adjacent_vertices.len(), vertex.adjacent_edges.len());
            for &adj in &vertex.adjacent_vertices {
                assert!(board.vertex(adj).unwrap().adjacent_vertices.contains(&vertex.id));
            }
            for &e in &vertex.adjacent_edges {
                assert!(board.edge(e).unwrap().vertices.contains(&vertex.id));
            }
        }
        for edge in board.edges() {
            assert_ne!(edge.vertices[0], edge.vertices[1]);
            assert!((1..=2).contains(&edge.adjacent_tiles.len()));
        }
    }

    #[test]
    fn test_every_tile_has_six_corners() {
        let board = board(4);
        for tile in board.tiles() {
            assert_eq!(board.tile_vertices(tile.index).len(), 6);
        }
        assert_eq!(center_ring(&board).len(), 6);
    }

    #[test]
    fn test_standard_board_has_correct_terrain_counts() {
        let board = board(5);
        let count = |t: Terrain| board.tiles().filter(|tile| tile.terrain == t).count();

        assert_eq!(count(Terrain::Forest), 4);
        assert_eq!(count(Terrain::Pasture), 4);
        assert_eq!(count(Terrain::Fields), 4);
        assert_eq!(count(Terrain::Hills), 3);
        assert_eq!(count(Terrain::Mountains), 3);
        assert_eq!(count(Terrain::Desert), 1);
    }

    #[test]
    fn test_standard_board_has_correct_number_distribution() {
        let board = board(6);
        let mut numbers: Vec<u8> = board.tiles().filter_map(|t| t.number).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, NUMBER_TOKENS.to_vec());
    }

    #[test]
    fn test_desert_has_no_number_and_robber() {
        let board = board(7);
        for tile in board.tiles() {
            if tile.terrain == Terrain::Desert {
                assert!(tile.number.is_none());
                assert_eq!(board.robber_tile(), tile.index);
            } else {
                assert!(tile.number.is_some());
            }
        }
    }

    #[test]
    fn test_same_seed_same_board() {
        assert_eq!(board(42), board(42));
    }

    #[test]
    fn test_balanced_board_has_no_adjacent_6_and_8() {
        for seed in 0..20 {
            let board = Board::generate(true, &mut GameRng::new(seed));
            let hot: Vec<&HexTile> = board
                .tiles()
                .filter(|t| matches!(t.number, Some(6) | Some(8)))
                .collect();
            for a in &hot {
                for b in &hot {
                    assert!(
                        a.index == b.index || a.coord.distance_to(&b.coord) > 1,
                        "seed {}: adjacent hot tiles at {} and {}",
                        seed,
                        a.coord,
                        b.coord
                    );
                }
            }
        }
    }

    #[test]
    fn test_ports_are_coastal_and_disjoint() {
        let board = board(8);
        let mut seen = HashSet::new();
        for port in board.ports() {
            let edge = board.edge(port.edge).unwrap();
            assert!(edge.is_coastal());
            assert_eq!(edge.vertices, port.vertices);
            for v in port.vertices {
                assert!(seen.insert(v), "vertex {} serves two ports", v);
                assert_eq!(board.vertex(v).unwrap().port, Some(port.port_type));
            }
        }

        let generic = board
            .ports()
            .iter()
            .filter(|p| p.port_type == PortType::Generic)
            .count();
        assert_eq!(generic, 4);
        for resource in Resource::ALL {
            assert!(board
                .ports()
                .iter()
                .any(|p| p.port_type == PortType::Specific(resource)));
        }
    }

    #[test]
    fn test_distance_rule() {
        let mut board = board(9);
        let vertex = 0;
        assert!(board.is_vertex_free(vertex));

        board.place_settlement(vertex, 0);
        assert!(!board.is_vertex_free(vertex));
        for &adj in &board.vertex(vertex).unwrap().adjacent_vertices.clone() {
            assert!(!board.is_vertex_free(adj));
        }
        assert!(!board.setup_settlement_spots().contains(&vertex));
    }

    #[test]
    fn test_road_connectivity() {
        let mut board = board(10);
        let vertex = 0;
        board.place_settlement(vertex, 0);

        let spots = board.road_spots(0);
        for e in board.vertex(vertex).unwrap().adjacent_edges.clone() {
            assert!(spots.contains(&e));
        }
        assert!(board.road_spots(1).is_empty());

        let first = board.vertex(vertex).unwrap().adjacent_edges[0];
        board.place_road(first, 0);
        let extended = board.road_spots(0);
        assert!(!extended.contains(&first));
        let far = board.edge(first).unwrap().other_end(vertex);
        for e in board.vertex(far).unwrap().adjacent_edges.clone() {
            assert_eq!(extended.contains(&e), e != first);
        }
    }

    #[test]
    fn test_road_network_blocked_by_opponent_building() {
        let mut board = board(11);
        let ring = center_ring(&board);
        board.place_road(ring[0], 0);

        // The far end of ring[0] towards ring[1]
        let shared = board.edge(ring[0]).unwrap().vertices[1];
        assert!(board.is_road_connected(ring[1], 0));

        board.place_settlement(shared, 1);
        assert!(!board.is_road_connected(ring[1], 0));
    }

    #[test]
    fn test_resource_distribution() {
        let mut board = board(12);
        let tile = board
            .tiles()
            .find(|t| t.number.is_some() && t.index != board.robber_tile())
            .unwrap()
            .clone();

        let vertex = board.tile_vertices(tile.index)[0];
        board.place_settlement(vertex, 0);

        let production = board.production_for_roll(tile.number.unwrap());
        assert!(production.contains(&(0, tile.resource().unwrap(), 1)));

        board.upgrade_to_city(vertex);
        let production = board.production_for_roll(tile.number.unwrap());
        assert!(production.contains(&(0, tile.resource().unwrap(), 2)));
    }

    #[test]
    fn test_robber_blocks_production() {
        let mut board = board(13);
        let tile = board
            .tiles()
            .find(|t| t.number.is_some() && t.index != board.robber_tile())
            .unwrap()
            .clone();
        let vertex = board.tile_vertices(tile.index)[0];
        board.place_settlement(vertex, 0);

        let before = board.production_for_roll(tile.number.unwrap()).len();
        board.move_robber(tile.index);
        let after = board.production_for_roll(tile.number.unwrap()).len();
        assert_eq!(after, before - 1);
    }

    #[test]
    fn test_longest_road_chain() {
        let mut board = board(14);
        let ring = center_ring(&board);
        for &e in &ring[..5] {
            board.place_road(e, 0);
        }
        assert_eq!(board.longest_road(0), 5);
        assert_eq!(board.longest_road(1), 0);
    }

    #[test]
    fn test_longest_road_closed_loop() {
        let mut board = board(15);
        for e in center_ring(&board) {
            board.place_road(e, 0);
        }
        assert_eq!(board.longest_road(0), 6);
    }

    #[test]
    fn test_longest_road_branch_does_not_double_count() {
        let mut board = board(16);
        let ring = center_ring(&board);
        board.place_road(ring[0], 0);
        board.place_road(ring[1], 0);
        // A spur off the vertex shared by ring[0] and ring[1]
        let shared = board.edge(ring[0]).unwrap().vertices[1];
        let spur = board
            .vertex(shared)
            .unwrap()
            .adjacent_edges
            .iter()
            .copied()
            .find(|e| !ring.contains(e))
            .unwrap();
        board.place_road(spur, 0);
        assert_eq!(board.longest_road(0), 2);
    }

    #[test]
    fn test_longest_road_cut_by_opponent_settlement() {
        let mut board = board(17);
        let ring = center_ring(&board);
        for &e in &ring[..5] {
            board.place_road(e, 0);
        }
        // Vertex between ring[1] and ring[2] splits the chain into 2 + 3
        let cut = board.edge(ring[1]).unwrap().vertices[1];
        assert!(board.edge(ring[2]).unwrap().vertices.contains(&cut));
        board.place_settlement(cut, 1);
        assert_eq!(board.longest_road(0), 3);
    }

    #[test]
    fn test_port_access() {
        let mut board = board(18);
        let port = board.ports()[0].clone();
        board.place_settlement(port.vertices[0], 2);
        assert_eq!(board.ports_for(2), vec![port.port_type]);
        assert!(board.ports_for(1).is_empty());
    }

    #[test]
    fn test_players_on_tile() {
        let mut board = board(19);
        let corners = board.tile_vertices(0);
        board.place_settlement(corners[0], 1);
        board.place_settlement(corners[3], 0);
        assert_eq!(board.players_on_tile(0), vec![0, 1]);
    }

    #[test]
    fn test_clone_shares_structure_but_not_occupancy() {
        let original = board(20);
        let mut copy = original.clone();
        copy.place_settlement(3, 1);
        assert!(original.building_at(3).is_none());
        assert_eq!(copy.building_at(3), Some(Building::settlement(1)));
    }
}
