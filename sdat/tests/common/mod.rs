//! Builds archives and streams in memory.
#![allow(dead_code)]

use byteorder::{WriteBytesExt, LE};

#[derive(Debug, Clone)]
pub struct StrmSpec {
    pub encoding: u8,
    pub channels: u8,
    pub loops: bool,
    pub loop_start: u32,
    pub sample_rate: u16,
    pub block_count: u32,
    pub block_samples: u32,
    pub last_block_samples: u32,
}

impl Default for StrmSpec {
    fn default() -> Self {
        Self {
            encoding: 1,
            channels: 2,
            loops: false,
            loop_start: 0,
            sample_rate: 32728,
            block_count: 3,
            block_samples: 100,
            last_block_samples: 37,
        }
    }
}

/// Encodes a STRM file whose sample at `(position, channel)` is `sample(..)`.
/// Pcm8 streams store the low byte.
pub fn build_strm(spec: &StrmSpec, sample: impl Fn(u32, u8) -> i16) -> Vec<u8> {
    let bytes_per_sample = if spec.encoding == 0 { 1 } else { 2 };
    let block_length = spec.block_samples * bytes_per_sample;
    let last_block_length = (spec.last_block_samples * bytes_per_sample + 3) & !3;
    let total = (spec.block_count - 1) * spec.block_samples + spec.last_block_samples;

    let mut payload = Vec::new();
    for block in 0..spec.block_count {
        let last = block + 1 == spec.block_count;
        let (samples, length) = if last {
            (spec.last_block_samples, last_block_length)
        } else {
            (spec.block_samples, block_length)
        };
        for channel in 0..spec.channels {
            let start = payload.len();
            for i in 0..samples {
                let value = sample(block * spec.block_samples + i, channel);
                if spec.encoding == 0 {
                    payload.push(value as u8);
                } else {
                    payload.write_i16::<LE>(value).unwrap();
                }
            }
            payload.resize(start + length as usize, 0);
        }
    }

    let mut data = Vec::new();
    data.extend_from_slice(b"STRM");
    data.write_u32::<LE>(0x0100_feff).unwrap();
    data.write_u32::<LE>(0x68 + payload.len() as u32).unwrap();
    data.write_u16::<LE>(0x10).unwrap();
    data.write_u16::<LE>(2).unwrap();

    data.extend_from_slice(b"HEAD");
    data.write_u32::<LE>(0x50).unwrap();
    data.push(spec.encoding);
    data.push(spec.loops as u8);
    data.push(spec.channels);
    data.push(0);
    data.write_u16::<LE>(spec.sample_rate).unwrap();
    data.write_u16::<LE>((16_756_991 / spec.sample_rate.max(1) as u32) as u16).unwrap();
    data.write_u32::<LE>(spec.loop_start).unwrap();
    data.write_u32::<LE>(total).unwrap();
    data.write_u32::<LE>(0x68).unwrap();
    data.write_u32::<LE>(spec.block_count).unwrap();
    data.write_u32::<LE>(block_length).unwrap();
    data.write_u32::<LE>(spec.block_samples).unwrap();
    data.write_u32::<LE>(last_block_length).unwrap();
    data.write_u32::<LE>(spec.last_block_samples).unwrap();
    data.resize(0x60, 0);

    data.extend_from_slice(b"DATA");
    data.write_u32::<LE>(8 + payload.len() as u32).unwrap();
    data.extend(payload);
    data
}

pub struct SequenceEntry {
    pub file_id: u16,
    pub bank_id: u16,
    pub volume: u8,
}

pub struct StreamEntry {
    pub file_id: u16,
    pub volume: u8,
    pub force_stereo: bool,
}

#[derive(Default)]
pub struct SdatBuilder {
    pub files: Vec<Vec<u8>>,
    pub sequences: Vec<Option<SequenceEntry>>,
    pub streams: Vec<Option<StreamEntry>>,
    pub sequence_names: Vec<Option<String>>,
    pub stream_names: Vec<Option<String>>,
    pub with_symbols: bool,
}

fn pad4(data: &mut Vec<u8>) {
    while data.len() % 4 != 0 {
        data.push(0);
    }
}

fn symb_block(slots: &[Vec<Option<String>>; 8]) -> Vec<u8> {
    let header_len = 0x40;
    let tables_len: usize = slots.iter().map(|names| 4 + 4 * names.len()).sum();

    let mut pointers = Vec::new();
    let mut tables = Vec::new();
    let mut strings = Vec::new();
    for names in slots.iter() {
        pointers.push((header_len + tables.len()) as u32);
        tables.write_u32::<LE>(names.len() as u32).unwrap();
        for name in names {
            match name {
                None => tables.write_u32::<LE>(0).unwrap(),
                Some(name) => {
                    let offset = header_len + tables_len + strings.len();
                    tables.write_u32::<LE>(offset as u32).unwrap();
                    strings.extend_from_slice(name.as_bytes());
                    strings.push(0);
                }
            }
        }
    }
    let mut block = b"SYMB".to_vec();
    let mut body = Vec::new();
    body.extend(tables);
    body.extend(strings);
    pad4(&mut body);
    block.write_u32::<LE>((header_len + body.len()) as u32).unwrap();
    for pointer in pointers {
        block.write_u32::<LE>(pointer).unwrap();
    }
    block.resize(header_len, 0);
    block.extend(body);
    block
}

fn info_block(slots: &[Vec<Option<Vec<u8>>>; 8]) -> Vec<u8> {
    let header_len = 0x40;
    let tables_len: usize = slots.iter().map(|records| 4 + 4 * records.len()).sum();

    let mut pointers = Vec::new();
    let mut tables = Vec::new();
    let mut records = Vec::new();
    for slot in slots.iter() {
        pointers.push((header_len + tables.len()) as u32);
        tables.write_u32::<LE>(slot.len() as u32).unwrap();
        for record in slot {
            match record {
                None => tables.write_u32::<LE>(0).unwrap(),
                Some(record) => {
                    let offset = header_len + tables_len + records.len();
                    tables.write_u32::<LE>(offset as u32).unwrap();
                    records.extend_from_slice(record);
                }
            }
        }
    }
    let mut block = b"INFO".to_vec();
    block.write_u32::<LE>((header_len + tables_len + records.len()) as u32).unwrap();
    for pointer in pointers {
        block.write_u32::<LE>(pointer).unwrap();
    }
    block.resize(header_len, 0);
    block.extend(tables);
    block.extend(records);
    block
}

impl SdatBuilder {
    pub fn build(&self) -> Vec<u8> {
        let mut info_slots: [Vec<Option<Vec<u8>>>; 8] = Default::default();
        info_slots[0] = self
            .sequences
            .iter()
            .map(|seq| {
                seq.as_ref().map(|seq| {
                    let mut record = Vec::new();
                    record.write_u16::<LE>(seq.file_id).unwrap();
                    record.write_u16::<LE>(0).unwrap();
                    record.write_u16::<LE>(seq.bank_id).unwrap();
                    record.extend_from_slice(&[seq.volume, 64, 32, 1, 0, 0]);
                    record
                })
            })
            .collect();
        info_slots[7] = self
            .streams
            .iter()
            .map(|strm| {
                strm.as_ref().map(|strm| {
                    let mut record = Vec::new();
                    record.write_u16::<LE>(strm.file_id).unwrap();
                    record.write_u16::<LE>(0).unwrap();
                    record.extend_from_slice(&[strm.volume, 50, 2, strm.force_stereo as u8]);
                    record.extend_from_slice(&[0; 4]);
                    record
                })
            })
            .collect();
        let info = info_block(&info_slots);

        let symb = if self.with_symbols {
            let mut symb_slots: [Vec<Option<String>>; 8] = Default::default();
            symb_slots[0] = self.sequence_names.clone();
            symb_slots[7] = self.stream_names.clone();
            Some(symb_block(&symb_slots))
        } else {
            None
        };

        let mut data = vec![0; 0x40];
        let symb_range = symb.map(|symb| {
            let range = (data.len() as u32, symb.len() as u32);
            data.extend(symb);
            range
        });
        let info_range = (data.len() as u32, info.len() as u32);
        data.extend(info);
        pad4(&mut data);

        let fat_pos = data.len();
        let fat_size = 12 + 16 * self.files.len();
        let mut file_pos = fat_pos + fat_size;
        let mut fat = b"FAT ".to_vec();
        fat.write_u32::<LE>(fat_size as u32).unwrap();
        fat.write_u32::<LE>(self.files.len() as u32).unwrap();
        let mut file_data = Vec::new();
        for file in &self.files {
            fat.write_u32::<LE>(file_pos as u32).unwrap();
            fat.write_u32::<LE>(file.len() as u32).unwrap();
            fat.extend_from_slice(&[0; 8]);
            file_data.extend_from_slice(file);
            pad4(&mut file_data);
            file_pos = fat_pos + fat_size + file_data.len();
        }
        data.extend(fat);
        data.extend(file_data);

        let (symb_pos, symb_size) = symb_range.unwrap_or((0, 0));
        let total = data.len() as u32;
        let mut header = Vec::new();
        header.extend_from_slice(b"SDAT");
        header.write_u32::<LE>(0x0100_feff).unwrap();
        header.write_u32::<LE>(total).unwrap();
        header.write_u16::<LE>(0x40).unwrap();
        header.write_u16::<LE>(if symb_range.is_some() { 4 } else { 3 }).unwrap();
        for &field in [
            symb_pos,
            symb_size,
            info_range.0,
            info_range.1,
            fat_pos as u32,
            fat_size as u32,
        ]
        .iter()
        {
            header.write_u32::<LE>(field).unwrap();
        }
        data[..header.len()].copy_from_slice(&header);
        data
    }
}
