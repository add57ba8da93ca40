//! The binary codec: byte buffers ⇄ typed packets.
//!
//! Framing is the same for both directions: one leading type byte, then a
//! tag-specific body. Multi-byte integers are little-endian. Text fields
//! carry no length prefix and run to the end of the buffer, so every
//! length check is made against the total buffer length.
//!
//! ```text
//! ┌─────┬──────────────────────────────────────┐
//! │ tag │ body (layout depends on tag)         │
//! └─────┴──────────────────────────────────────┘
//!   u8    u16/u32 little-endian, u8, UTF-8 tail
//! ```

use crate::{
    BoardConfig, BoardState, CellUpdate, ClientPacket, Color, Entry, FullBoard,
    LossReport, PlayerId, PlayerInfo, Position, ProtocolError, ServerPacket,
};

/// Bytes in one sparse update record: row, col, entry, owner.
const SPARSE_RECORD_LEN: usize = 6;
/// Bytes in one coordinate record: row, col.
const POSITION_LEN: usize = 4;
/// Tag + width + height + mine count.
const BOARD_CONFIG_PACKET_LEN: usize = 1 + 2 + 2 + 4;
/// Tag + width + height + mine count + board state.
const FULL_BOARD_HEADER_LEN: usize = BOARD_CONFIG_PACKET_LEN + 1;
/// Tag + player id + four color channels.
const PLAYER_INFO_HEADER_LEN: usize = 1 + 1 + 4;
/// Tag + loser id + hit mine count.
const BOARD_LOSS_HEADER_LEN: usize = 1 + 1 + 1;
/// Tag + row + col.
const SQUARE_PACKET_LEN: usize = 1 + 2 + 2;

/// A packet family that has a binary wire form.
///
/// Implemented by [`ServerPacket`] and [`ClientPacket`]. `decode_from`
/// receives the whole buffer, type byte included.
pub trait WirePacket: Sized {
    /// Appends the wire form of `self` (type byte first) to `out`.
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), ProtocolError>;

    /// Parses one complete packet.
    fn decode_from(data: &[u8]) -> Result<Self, ProtocolError>;
}

/// Converts packets to and from bytes.
///
/// Stateless; the transport hands over exactly one packet per message, so
/// there is no stream reassembly here.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a packet into a fresh buffer.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if the value cannot be
    /// represented on the wire.
    fn encode<P: WirePacket>(&self, packet: &P) -> Result<Vec<u8>, ProtocolError>;

    /// Parses a buffer into a packet.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Malformed`] for length/shape violations and
    /// [`ProtocolError::UnknownPacketType`] for unassigned type bytes.
    fn decode<P: WirePacket>(&self, data: &[u8]) -> Result<P, ProtocolError>;
}

/// The little-endian binary [`Codec`] spoken by the game authority.
///
/// ```rust
/// use minesync_protocol::{BinaryCodec, ClientPacket, Codec, Position};
///
/// let codec = BinaryCodec;
/// let packet = ClientPacket::RevealSquare(Position::new(1, 2));
///
/// let bytes = codec.encode(&packet).unwrap();
/// assert_eq!(bytes, [0, 1, 0, 2, 0]);
///
/// let decoded: ClientPacket = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, packet);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl Codec for BinaryCodec {
    fn encode<P: WirePacket>(&self, packet: &P) -> Result<Vec<u8>, ProtocolError> {
        let mut out = Vec::new();
        packet.encode_into(&mut out)?;
        Ok(out)
    }

    fn decode<P: WirePacket>(&self, data: &[u8]) -> Result<P, ProtocolError> {
        P::decode_from(data)
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Cursor over a packet buffer that turns short reads into `Malformed`.
struct Reader<'a> {
    packet: &'static str,
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Starts reading just after the type byte.
    fn new(packet: &'static str, buf: &'a [u8]) -> Self {
        Self { packet, buf, pos: 1 }
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        if self.remaining() < n {
            return Err(ProtocolError::malformed(
                self.packet,
                format!("truncated at offset {}: need {n} more bytes", self.pos),
            ));
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ProtocolError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, ProtocolError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn position(&mut self) -> Result<Position, ProtocolError> {
        let row = self.u16()?;
        let col = self.u16()?;
        Ok(Position { row, col })
    }

    fn board_config(&mut self) -> Result<BoardConfig, ProtocolError> {
        let width = self.u16()?;
        let height = self.u16()?;
        let mine_count = self.u32()?;
        Ok(BoardConfig {
            width,
            height,
            mine_count,
        })
    }

    fn rest(&mut self) -> &'a [u8] {
        let bytes = &self.buf[self.pos.min(self.buf.len())..];
        self.pos = self.buf.len();
        bytes
    }
}

/// Fails unless `data` is exactly `expected` bytes long.
fn expect_len(packet: &'static str, data: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if data.len() == expected {
        Ok(())
    } else {
        Err(ProtocolError::malformed(
            packet,
            format!("expected {expected} bytes, got {}", data.len()),
        ))
    }
}

/// Fails unless `data` is at least `min` bytes long.
fn expect_min_len(packet: &'static str, data: &[u8], min: usize) -> Result<(), ProtocolError> {
    if data.len() >= min {
        Ok(())
    } else {
        Err(ProtocolError::malformed(
            packet,
            format!("expected at least {min} bytes, got {}", data.len()),
        ))
    }
}

fn type_byte(data: &[u8]) -> Result<u8, ProtocolError> {
    data.first()
        .copied()
        .ok_or_else(|| ProtocolError::malformed("empty", "buffer has no type byte"))
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_position(out: &mut Vec<u8>, pos: Position) {
    put_u16(out, pos.row);
    put_u16(out, pos.col);
}

fn put_board_config(out: &mut Vec<u8>, config: BoardConfig) {
    put_u16(out, config.width);
    put_u16(out, config.height);
    put_u32(out, config.mine_count);
}

fn put_player_info(out: &mut Vec<u8>, info: &PlayerInfo) {
    out.push(info.player_id.0);
    out.extend_from_slice(&[info.color.r, info.color.g, info.color.b, info.color.a]);
    out.extend_from_slice(info.name.as_bytes());
}

// ---------------------------------------------------------------------------
// Server packets
// ---------------------------------------------------------------------------

impl WirePacket for ServerPacket {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
        match self {
            Self::FullBoard(board) => {
                let cells = board.cell_count();
                if board.entries.len() != cells || board.owners.len() != cells {
                    return Err(ProtocolError::InvalidMessage(format!(
                        "FullBoard declares {}x{} ({cells} cells) but carries {} entries and {} owners",
                        board.config.width,
                        board.config.height,
                        board.entries.len(),
                        board.owners.len(),
                    )));
                }
                out.reserve(FULL_BOARD_HEADER_LEN + 2 * cells);
                out.push(self.tag());
                put_board_config(out, board.config);
                out.push(board.state.to_byte());
                out.extend(board.entries.iter().map(|entry| entry.0));
                out.extend(board.owners.iter().map(|owner| owner.0));
            }
            Self::SparseBoard(updates) => {
                out.reserve(1 + SPARSE_RECORD_LEN * updates.len());
                out.push(self.tag());
                for update in updates {
                    put_position(out, update.pos);
                    out.push(update.entry.0);
                    out.push(update.owner.0);
                }
            }
            Self::PlayerInfo(info) | Self::YourPlayerInfo(info) => {
                out.reserve(PLAYER_INFO_HEADER_LEN + info.name.len());
                out.push(self.tag());
                put_player_info(out, info);
            }
            Self::BoardLoss(report) => {
                let hit_count = u8::try_from(report.hit_mines.len()).map_err(|_| {
                    ProtocolError::InvalidMessage(format!(
                        "BoardLoss carries {} hit mines, at most 255 fit",
                        report.hit_mines.len()
                    ))
                })?;
                out.reserve(
                    BOARD_LOSS_HEADER_LEN
                        + POSITION_LEN * (report.hit_mines.len() + report.wrong_flags.len()),
                );
                out.push(self.tag());
                out.push(report.loser.0);
                out.push(hit_count);
                for &pos in report.hit_mines.iter().chain(&report.wrong_flags) {
                    put_position(out, pos);
                }
            }
            Self::BoardWin => out.push(self.tag()),
            Self::NextBoardConfig(config) => {
                out.push(self.tag());
                put_board_config(out, *config);
            }
        }
        Ok(())
    }

    fn decode_from(data: &[u8]) -> Result<Self, ProtocolError> {
        match type_byte(data)? {
            Self::FULL_BOARD => decode_full_board(data),
            Self::SPARSE_BOARD => decode_sparse_board(data),
            Self::PLAYER_INFO => decode_player_info("PlayerInfo", data).map(Self::PlayerInfo),
            Self::YOUR_PLAYER_INFO => {
                decode_player_info("YourPlayerInfo", data).map(Self::YourPlayerInfo)
            }
            Self::BOARD_LOSS => decode_board_loss(data),
            Self::BOARD_WIN => {
                expect_len("BoardWin", data, 1)?;
                Ok(Self::BoardWin)
            }
            Self::NEXT_BOARD_CONFIG => {
                expect_len("NextBoardConfig", data, BOARD_CONFIG_PACKET_LEN)?;
                let config = Reader::new("NextBoardConfig", data).board_config()?;
                Ok(Self::NextBoardConfig(config))
            }
            other => Err(ProtocolError::UnknownPacketType(other)),
        }
    }
}

fn decode_full_board(data: &[u8]) -> Result<ServerPacket, ProtocolError> {
    const NAME: &str = "FullBoard";
    expect_min_len(NAME, data, FULL_BOARD_HEADER_LEN)?;

    let mut reader = Reader::new(NAME, data);
    let config = reader.board_config()?;
    let state_byte = reader.u8()?;
    let state = BoardState::from_byte(state_byte)
        .ok_or_else(|| ProtocolError::malformed(NAME, format!("unknown board state {state_byte}")))?;

    let cells = usize::from(config.width) * usize::from(config.height);
    let expected = cells
        .checked_mul(2)
        .and_then(|grids| grids.checked_add(FULL_BOARD_HEADER_LEN))
        .ok_or_else(|| ProtocolError::malformed(NAME, "board dimensions overflow"))?;
    expect_len(NAME, data, expected)?;

    let entries = reader.take(cells)?.iter().copied().map(Entry).collect();
    let owners = reader.take(cells)?.iter().copied().map(PlayerId).collect();

    Ok(ServerPacket::FullBoard(FullBoard {
        config,
        state,
        entries,
        owners,
    }))
}

fn decode_sparse_board(data: &[u8]) -> Result<ServerPacket, ProtocolError> {
    const NAME: &str = "SparseBoard";
    let body = data.len() - 1;
    if body % SPARSE_RECORD_LEN != 0 {
        return Err(ProtocolError::malformed(
            NAME,
            format!("body of {body} bytes is not a whole number of {SPARSE_RECORD_LEN}-byte records"),
        ));
    }

    let mut reader = Reader::new(NAME, data);
    let mut updates = Vec::with_capacity(body / SPARSE_RECORD_LEN);
    while reader.remaining() > 0 {
        let pos = reader.position()?;
        let entry = Entry(reader.u8()?);
        let owner = PlayerId(reader.u8()?);
        updates.push(CellUpdate { pos, entry, owner });
    }
    Ok(ServerPacket::SparseBoard(updates))
}

fn decode_player_info(name: &'static str, data: &[u8]) -> Result<PlayerInfo, ProtocolError> {
    expect_min_len(name, data, PLAYER_INFO_HEADER_LEN)?;

    let mut reader = Reader::new(name, data);
    let player_id = PlayerId(reader.u8()?);
    let color = Color {
        r: reader.u8()?,
        g: reader.u8()?,
        b: reader.u8()?,
        a: reader.u8()?,
    };
    // Invalid sequences become U+FFFD; the identity is still worth keeping.
    let name = String::from_utf8_lossy(reader.rest()).into_owned();

    Ok(PlayerInfo {
        player_id,
        color,
        name,
    })
}

fn decode_board_loss(data: &[u8]) -> Result<ServerPacket, ProtocolError> {
    const NAME: &str = "BoardLoss";
    expect_min_len(NAME, data, BOARD_LOSS_HEADER_LEN)?;

    let mut reader = Reader::new(NAME, data);
    let loser = PlayerId(reader.u8()?);
    let hit_count = usize::from(reader.u8()?);
    expect_min_len(NAME, data, BOARD_LOSS_HEADER_LEN + POSITION_LEN * hit_count)?;

    let hit_mines = (0..hit_count)
        .map(|_| reader.position())
        .collect::<Result<Vec<_>, _>>()?;

    let tail = reader.remaining();
    if tail % POSITION_LEN != 0 {
        return Err(ProtocolError::malformed(
            NAME,
            format!("{tail} trailing bytes are not a whole number of coordinates"),
        ));
    }
    let wrong_flags = (0..tail / POSITION_LEN)
        .map(|_| reader.position())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ServerPacket::BoardLoss(LossReport {
        loser,
        hit_mines,
        wrong_flags,
    }))
}

// ---------------------------------------------------------------------------
// Client packets
// ---------------------------------------------------------------------------

impl WirePacket for ClientPacket {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
        out.push(self.tag());
        match *self {
            Self::RevealSquare(pos) | Self::ChordSquare(pos) | Self::ToggleFlag(pos) => {
                put_position(out, pos);
            }
            Self::NewBoard => {}
            Self::NextBoardConfig(config) => put_board_config(out, config),
        }
        Ok(())
    }

    fn decode_from(data: &[u8]) -> Result<Self, ProtocolError> {
        let tag = type_byte(data)?;
        match tag {
            Self::REVEAL_SQUARE | Self::CHORD_SQUARE | Self::TOGGLE_FLAG => {
                let name = match tag {
                    Self::REVEAL_SQUARE => "RevealSquare",
                    Self::CHORD_SQUARE => "ChordSquare",
                    _ => "ToggleFlag",
                };
                expect_len(name, data, SQUARE_PACKET_LEN)?;
                let pos = Reader::new(name, data).position()?;
                Ok(match tag {
                    Self::REVEAL_SQUARE => Self::RevealSquare(pos),
                    Self::CHORD_SQUARE => Self::ChordSquare(pos),
                    _ => Self::ToggleFlag(pos),
                })
            }
            Self::NEW_BOARD => {
                expect_len("NewBoard", data, 1)?;
                Ok(Self::NewBoard)
            }
            Self::NEXT_BOARD_CONFIG => {
                expect_len("NextBoardConfig", data, BOARD_CONFIG_PACKET_LEN)?;
                let config = Reader::new("NextBoardConfig", data).board_config()?;
                Ok(Self::NextBoardConfig(config))
            }
            other => Err(ProtocolError::UnknownPacketType(other)),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_server(data: &[u8]) -> Result<ServerPacket, ProtocolError> {
        BinaryCodec.decode(data)
    }

    fn assert_malformed(result: Result<ServerPacket, ProtocolError>, packet: &str) {
        match result {
            Err(ProtocolError::Malformed { packet: got, .. }) => assert_eq!(got, packet),
            other => panic!("expected malformed {packet}, got {other:?}"),
        }
    }

    // =====================================================================
    // Server packets: decode
    // =====================================================================

    #[test]
    fn test_decode_full_board_two_by_two_reproduces_grids() {
        // Scenario: 2x2, one mine, ongoing, [[0,1],[1,255]], no owners.
        let mut data = vec![0, 2, 0, 2, 0, 1, 0, 0, 0, 1];
        data.extend_from_slice(&[0, 1, 1, 255]);
        data.extend_from_slice(&[0, 0, 0, 0]);

        let packet = decode_server(&data).expect("should decode");

        let ServerPacket::FullBoard(board) = packet else {
            panic!("expected FullBoard, got {packet:?}");
        };
        assert_eq!(
            board.config,
            BoardConfig {
                width: 2,
                height: 2,
                mine_count: 1
            }
        );
        assert_eq!(board.state, BoardState::Ongoing);
        assert_eq!(board.entries, vec![Entry(0), Entry(1), Entry(1), Entry::MINE]);
        assert_eq!(board.owners, vec![PlayerId::NONE; 4]);
    }

    #[test]
    fn test_decode_full_board_wrong_length_is_malformed() {
        // Declares 2x2 but carries only one grid.
        let data = [0, 2, 0, 2, 0, 1, 0, 0, 0, 1, 0, 1, 1, 255];
        assert_malformed(decode_server(&data), "FullBoard");
    }

    #[test]
    fn test_decode_full_board_unknown_state_is_malformed() {
        let data = [0, 0, 0, 0, 0, 0, 0, 0, 0, 9];
        assert_malformed(decode_server(&data), "FullBoard");
    }

    #[test]
    fn test_decode_full_board_header_only_is_empty_board() {
        let data = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let packet = decode_server(&data).unwrap();
        assert!(matches!(packet, ServerPacket::FullBoard(ref b) if b.entries.is_empty()));
    }

    #[test]
    fn test_decode_sparse_board_reads_records_in_order() {
        let data = [1, 0, 0, 1, 0, 254, 3, 2, 0, 0, 0, 4, 7];
        let packet = decode_server(&data).unwrap();
        assert_eq!(
            packet,
            ServerPacket::SparseBoard(vec![
                CellUpdate {
                    pos: Position::new(0, 1),
                    entry: Entry::FLAGGED,
                    owner: PlayerId(3),
                },
                CellUpdate {
                    pos: Position::new(2, 0),
                    entry: Entry(4),
                    owner: PlayerId(7),
                },
            ])
        );
    }

    #[test]
    fn test_decode_sparse_board_partial_record_is_malformed() {
        let data = [1, 0, 0, 1, 0, 254];
        assert_malformed(decode_server(&data), "SparseBoard");
    }

    #[test]
    fn test_decode_sparse_board_without_records_is_empty() {
        assert_eq!(decode_server(&[1]).unwrap(), ServerPacket::SparseBoard(vec![]));
    }

    #[test]
    fn test_decode_player_info_reads_color_and_name() {
        let mut data = vec![2, 5, 10, 20, 30, 255];
        data.extend_from_slice("Zoë".as_bytes());

        let packet = decode_server(&data).unwrap();

        assert_eq!(
            packet,
            ServerPacket::PlayerInfo(PlayerInfo {
                player_id: PlayerId(5),
                color: Color::new(10, 20, 30, 255),
                name: "Zoë".to_string(),
            })
        );
    }

    #[test]
    fn test_decode_your_player_info_allows_empty_name() {
        let data = [3, 1, 0, 0, 0, 128];
        let packet = decode_server(&data).unwrap();
        let ServerPacket::YourPlayerInfo(info) = packet else {
            panic!("expected YourPlayerInfo");
        };
        assert_eq!(info.player_id, PlayerId(1));
        assert!(info.name.is_empty());
    }

    #[test]
    fn test_decode_player_info_truncated_header_is_malformed() {
        assert_malformed(decode_server(&[2, 5, 10, 20, 30]), "PlayerInfo");
    }

    #[test]
    fn test_decode_player_info_invalid_utf8_replaces_bytes() {
        let packet = decode_server(&[2, 5, 0, 0, 0, 0, 0xff, 0xfe]).unwrap();
        let ServerPacket::PlayerInfo(info) = packet else {
            panic!("expected PlayerInfo, got {packet:?}");
        };
        assert_eq!(info.player_id, PlayerId(5));
        assert_eq!(info.name, "\u{fffd}\u{fffd}");
    }

    #[test]
    fn test_decode_your_player_info_stray_byte_keeps_identity() {
        let data = [3, 1, 1, 2, 3, 255, b'a', b'l', 0xff, b'c', b'e'];
        let packet = decode_server(&data).unwrap();
        assert_eq!(
            packet,
            ServerPacket::YourPlayerInfo(PlayerInfo {
                player_id: PlayerId(1),
                color: Color::new(1, 2, 3, 255),
                name: "al\u{fffd}ce".to_string(),
            })
        );
    }

    #[test]
    fn test_decode_board_loss_splits_hit_mines_and_wrong_flags() {
        // loser 4, one hit mine at (1,1), wrong flags at (0,2) and (3,0)
        let data = [4, 4, 1, 1, 0, 1, 0, 0, 0, 2, 0, 3, 0, 0, 0];
        let packet = decode_server(&data).unwrap();
        assert_eq!(
            packet,
            ServerPacket::BoardLoss(LossReport {
                loser: PlayerId(4),
                hit_mines: vec![Position::new(1, 1)],
                wrong_flags: vec![Position::new(0, 2), Position::new(3, 0)],
            })
        );
    }

    #[test]
    fn test_decode_board_loss_missing_hit_mines_is_malformed() {
        // Claims two hit mines but carries one.
        let data = [4, 4, 2, 1, 0, 1, 0];
        assert_malformed(decode_server(&data), "BoardLoss");
    }

    #[test]
    fn test_decode_board_loss_ragged_wrong_flags_is_malformed() {
        let data = [4, 4, 0, 1, 0, 1];
        assert_malformed(decode_server(&data), "BoardLoss");
    }

    #[test]
    fn test_decode_board_win_with_payload_is_malformed() {
        assert_eq!(decode_server(&[5]).unwrap(), ServerPacket::BoardWin);
        assert_malformed(decode_server(&[5, 0]), "BoardWin");
    }

    #[test]
    fn test_decode_next_board_config_requires_exact_length() {
        let data = [6, 30, 0, 16, 0, 99, 0, 0, 0];
        assert_eq!(
            decode_server(&data).unwrap(),
            ServerPacket::NextBoardConfig(BoardConfig {
                width: 30,
                height: 16,
                mine_count: 99
            })
        );
        assert_malformed(decode_server(&data[..8]), "NextBoardConfig");
    }

    #[test]
    fn test_decode_empty_buffer_is_malformed() {
        assert_malformed(decode_server(&[]), "empty");
    }

    #[test]
    fn test_decode_unknown_tag_is_rejected() {
        assert_eq!(decode_server(&[7]), Err(ProtocolError::UnknownPacketType(7)));
        let client: Result<ClientPacket, _> = BinaryCodec.decode(&[200, 0]);
        assert_eq!(client, Err(ProtocolError::UnknownPacketType(200)));
    }

    // =====================================================================
    // Server packets: encode
    // =====================================================================

    #[test]
    fn test_encode_full_board_decodes_to_same_grids() {
        let board = FullBoard {
            config: BoardConfig {
                width: 3,
                height: 2,
                mine_count: 1,
            },
            state: BoardState::Lost,
            entries: vec![Entry(0), Entry(1), Entry::FLAGGED, Entry(9), Entry::MINE, Entry::UNKNOWN],
            owners: vec![PlayerId(2), PlayerId(2), PlayerId(3), PlayerId(3), PlayerId(0), PlayerId(0)],
        };
        let packet = ServerPacket::FullBoard(board);

        let bytes = BinaryCodec.encode(&packet).unwrap();

        assert_eq!(bytes.len(), 10 + 2 * 6);
        assert_eq!(decode_server(&bytes).unwrap(), packet);
    }

    #[test]
    fn test_encode_full_board_shape_mismatch_is_invalid() {
        let packet = ServerPacket::FullBoard(FullBoard {
            config: BoardConfig {
                width: 2,
                height: 2,
                mine_count: 0,
            },
            state: BoardState::Ongoing,
            entries: vec![Entry(0); 3],
            owners: vec![PlayerId(0); 4],
        });
        assert!(matches!(
            BinaryCodec.encode(&packet),
            Err(ProtocolError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_encode_board_loss_too_many_hit_mines_is_invalid() {
        let packet = ServerPacket::BoardLoss(LossReport {
            loser: PlayerId(1),
            hit_mines: vec![Position::new(0, 0); 256],
            wrong_flags: vec![],
        });
        assert!(matches!(
            BinaryCodec.encode(&packet),
            Err(ProtocolError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_encode_server_packets_round_trip() {
        let packets = [
            ServerPacket::SparseBoard(vec![CellUpdate {
                pos: Position::new(300, 65535),
                entry: Entry(8),
                owner: PlayerId(255),
            }]),
            ServerPacket::YourPlayerInfo(PlayerInfo {
                player_id: PlayerId(9),
                color: Color::new(1, 2, 3, 4),
                name: "mine sweeper".to_string(),
            }),
            ServerPacket::BoardLoss(LossReport {
                loser: PlayerId(2),
                hit_mines: vec![Position::new(4, 5)],
                wrong_flags: vec![],
            }),
            ServerPacket::BoardWin,
            ServerPacket::NextBoardConfig(BoardConfig {
                width: 100,
                height: 100,
                mine_count: u32::MAX,
            }),
        ];
        for packet in packets {
            let bytes = BinaryCodec.encode(&packet).unwrap();
            assert_eq!(bytes[0], packet.tag());
            assert_eq!(decode_server(&bytes).unwrap(), packet, "{}", packet.name());
        }
    }

    // =====================================================================
    // Client packets
    // =====================================================================

    #[test]
    fn test_encode_client_packets_use_documented_layout() {
        let codec = BinaryCodec;
        assert_eq!(
            codec.encode(&ClientPacket::ChordSquare(Position::new(0x0102, 3))).unwrap(),
            [1, 0x02, 0x01, 3, 0]
        );
        assert_eq!(
            codec.encode(&ClientPacket::ToggleFlag(Position::new(0, 1))).unwrap(),
            [2, 0, 0, 1, 0]
        );
        assert_eq!(codec.encode(&ClientPacket::NewBoard).unwrap(), [3]);
        assert_eq!(
            codec
                .encode(&ClientPacket::NextBoardConfig(BoardConfig {
                    width: 16,
                    height: 8,
                    mine_count: 0x0102_0304,
                }))
                .unwrap(),
            [4, 16, 0, 8, 0, 4, 3, 2, 1]
        );
    }

    #[test]
    fn test_decode_client_packets_round_trip_at_field_extremes() {
        let codec = BinaryCodec;
        let packets = [
            ClientPacket::RevealSquare(Position::new(0, 0)),
            ClientPacket::RevealSquare(Position::new(u16::MAX, u16::MAX)),
            ClientPacket::ChordSquare(Position::new(12, 34)),
            ClientPacket::ToggleFlag(Position::new(u16::MAX, 0)),
            ClientPacket::NewBoard,
            ClientPacket::NextBoardConfig(BoardConfig {
                width: 0,
                height: u16::MAX,
                mine_count: u32::MAX,
            }),
        ];
        for packet in packets {
            let bytes = codec.encode(&packet).unwrap();
            let decoded: ClientPacket = codec.decode(&bytes).unwrap();
            assert_eq!(decoded, packet);
        }
    }

    #[test]
    fn test_decode_client_packets_round_trip_for_random_fields() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let codec = BinaryCodec;
        let mut rng = StdRng::seed_from_u64(0xb0a2d);
        for _ in 0..500 {
            let pos = Position::new(rng.random(), rng.random());
            let packet = match rng.random_range(0..5) {
                0 => ClientPacket::RevealSquare(pos),
                1 => ClientPacket::ChordSquare(pos),
                2 => ClientPacket::ToggleFlag(pos),
                3 => ClientPacket::NewBoard,
                _ => ClientPacket::NextBoardConfig(BoardConfig {
                    width: rng.random(),
                    height: rng.random(),
                    mine_count: rng.random(),
                }),
            };
            let bytes = codec.encode(&packet).unwrap();
            let decoded: ClientPacket = codec.decode(&bytes).unwrap();
            assert_eq!(decoded, packet, "{bytes:?}");
        }
    }

    #[test]
    fn test_decode_client_packet_wrong_length_is_malformed() {
        let codec = BinaryCodec;
        let cases: [(&[u8], &str); 4] = [
            (&[0, 1, 0, 2], "RevealSquare"),
            (&[2, 1, 0, 2, 0, 0], "ToggleFlag"),
            (&[3, 0], "NewBoard"),
            (&[4, 1, 0, 1, 0], "NextBoardConfig"),
        ];
        for (data, name) in cases {
            let result: Result<ClientPacket, _> = codec.decode(data);
            assert!(
                matches!(result, Err(ProtocolError::Malformed { packet, .. }) if packet == name),
                "{name}: {result:?}"
            );
        }
    }
}
