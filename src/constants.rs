/// BMP 文件头 (BITMAPFILEHEADER) 的固定大小 (字节)。
pub const FILE_HEADER_SIZE: usize = 14;

/// 唯一受支持的信息头 (BITMAPINFOHEADER) 大小 (字节)。
/// 其他大小 (如 V4/V5 头) 一律视为不受支持的变体。
pub const INFO_HEADER_SIZE: usize = 40;

/// 文件头加信息头的总长度，也是最常见的像素数据偏移。
pub const HEADERS_SIZE: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

/// BMP 文件开头的两字节标识 "BM"。
pub const BMP_MAGIC: [u8; 2] = *b"BM";

/// 唯一受支持的每像素位数。
pub const SUPPORTED_BIT_COUNT: u16 = 24;

/// 每个像素占用的字节数 (B, G, R 三个通道，无 alpha)。
pub const BYTES_PER_PIXEL: usize = 3;

/// 每一行像素在磁盘上的长度必须对齐到的字节边界。
pub const ROW_ALIGNMENT: usize = 4;

/// 高半字节掩码。
pub const HIGH_NIBBLE_MASK: u8 = 0xF0;
